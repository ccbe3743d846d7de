//! Query command - request/response against the beacon

use anyhow::Result;
use beacon_client::RemoteClient;
use beacon_core::Request;
use clap::ValueEnum;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::OutputContext;

/// What to ask the beacon for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Vehicle identity (RBID)
    Id,
    /// Position and heading (RPOS)
    Pos,
    /// Obstacle flag (OBSF)
    Obstacle,
    /// All of the above, in that order
    All,
}

impl Target {
    pub fn requests(self) -> &'static [Request] {
        match self {
            Target::Id => &[Request::Identity],
            Target::Pos => &[Request::Position],
            Target::Obstacle => &[Request::Obstacle],
            Target::All => &Request::ALL,
        }
    }
}

/// Issue the requests for each target over one connection
pub async fn query(client: &mut RemoteClient, targets: &[Target], ctx: &OutputContext) -> Result<()> {
    for request in targets.iter().flat_map(|t| t.requests()) {
        let reply = client.request(*request).await?;
        ctx.print_reply(*request, &reply);
    }
    Ok(())
}

/// Read tags from stdin, one per line, until EOF or `quit`
pub async fn interactive(client: &mut RemoteClient, ctx: &OutputContext) -> Result<()> {
    ctx.info("Enter a tag (RBID, RPOS, OBSF), or quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }

        match line.parse::<Request>() {
            Ok(request) => {
                let reply = client.request(request).await?;
                ctx.print_reply(request, &reply);
            }
            // The beacon never answers an unknown tag, so don't send one
            Err(e) => ctx.warn(&format!("{} (not sent)", e)),
        }
    }
    Ok(())
}
