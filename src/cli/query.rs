//! Read-only commands: list, show, status.

use cosign::{ProposalFilter, ProposalId};

use super::render::{self, ProposalView, StatusView};
use super::session::Session;

pub fn list(session: &Session, filter: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let filter: ProposalFilter = filter.trim().parse()?;
    let threshold = session.multisig.quorum_size()?;
    let proposals: Vec<_> = session.multisig.list(filter).collect();

    if json {
        let views: Vec<_> = proposals
            .iter()
            .map(|p| ProposalView::new(p, threshold))
            .collect();
        println!("{}", render::to_json(&views)?);
        return Ok(());
    }

    if proposals.is_empty() {
        match filter {
            ProposalFilter::All => println!("No proposals."),
            other => println!("No {} proposals.", other),
        }
        return Ok(());
    }
    for proposal in &proposals {
        println!("{}", render::proposal_line(proposal, threshold));
    }
    Ok(())
}

pub fn show(session: &Session, id: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let proposal = session.multisig.get(ProposalId(id))?;
    let threshold = session.multisig.quorum_size()?;

    if json {
        println!("{}", render::to_json(&ProposalView::new(&proposal, threshold))?);
    } else {
        print!("{}", render::proposal_detail(&proposal, threshold));
    }
    Ok(())
}

/// Group membership and proposal counts
pub fn status(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    session.require_configured()?;
    let members = session.multisig.members()?;
    let summary = session.multisig.summary()?;

    if json {
        let view = StatusView {
            members: members.members(),
            threshold: members.quorum_size(),
            summary: &summary,
        };
        println!("{}", render::to_json(&view)?);
    } else {
        print!("{}", render::status_text(&members, &summary));
    }
    Ok(())
}
