//! Mutating proposal commands: propose, approve, execute.

use cosign::{MemberId, ProposalId};
use std::io::{self, Write};

use super::render;
use super::session::Session;

/// Create a proposal as `caller`; the caller's approval is recorded with it.
pub async fn propose(
    session: &Session,
    caller: &str,
    recipient: &str,
    asset: &str,
    amount: &str,
    description: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let caller = MemberId::new(caller.trim());
    let proposal = session.multisig.create_proposal(
        &caller,
        recipient.trim(),
        asset.trim(),
        amount.trim(),
        description,
    )?;
    session.commit().await?;

    let threshold = session.multisig.quorum_size()?;
    println!("📝 Proposal {} created", proposal.id);
    println!("{}", render::proposal_line(&proposal, threshold));
    Ok(())
}

pub async fn approve(
    session: &Session,
    caller: &str,
    id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let caller = MemberId::new(caller.trim());
    let proposal = session.multisig.approve(&caller, ProposalId(id))?;
    session.commit().await?;

    let threshold = session.multisig.quorum_size()?;
    println!("👍 {} approved {}", caller.short(), proposal.id);
    println!("{}", render::proposal_line(&proposal, threshold));
    Ok(())
}

/// Execute a ready proposal, asking for confirmation unless `yes` is set.
pub async fn execute(
    session: &Session,
    caller: &str,
    id: u64,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let caller = MemberId::new(caller.trim());
    let id = ProposalId(id);

    if !yes {
        let proposal = session.multisig.get(id)?;
        let threshold = session.multisig.quorum_size()?;
        println!("{}", render::proposal_detail(&proposal, threshold));
        let expected = id.0.to_string();
        let prompt = format!("Type the proposal number ({}) to execute: ", expected);
        if !confirm_action(&prompt, &expected)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let proposal = session.multisig.execute(&caller, id)?;
    session.commit().await?;

    println!("🚀 Proposal {} executed", proposal.id);
    if let Some(receipt) = proposal.receipt() {
        println!("  Receipt: {}", receipt.as_str());
    }
    Ok(())
}

/// Check if the user's confirmation input matches the expected value.
pub fn parse_confirmation(input: &str, expected: &str) -> bool {
    input.trim() == expected
}

fn confirm_action(prompt: &str, expected: &str) -> Result<bool, Box<dyn std::error::Error>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(parse_confirmation(&input, expected))
}
