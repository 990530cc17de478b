use cosign::MemberId;

use super::session::Session;

/// Set the group members and approval threshold
///
/// Fails once proposals exist; the group is fixed from then on.
pub async fn execute(
    session: &Session,
    members: Vec<String>,
    threshold: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let members: Vec<MemberId> = members.iter().map(|m| MemberId::new(m.trim())).collect();
    let set = session.multisig.configure(members, threshold)?;
    session.commit().await?;

    println!(
        "✅ Group configured: {}-of-{}",
        set.quorum_size(),
        set.size()
    );
    for member in set.members() {
        println!("  - {}", member);
    }
    Ok(())
}
