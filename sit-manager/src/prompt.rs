use futures::future::BoxFuture;
use sit_lib::game::installer::core::traits::MirrorSelector;
use sit_lib::game::installer::patcher::MirrorCandidates;
use sit_lib::Release;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Asks on the terminal which mirror to download a patch from.
pub struct StdinMirrorSelector;

impl MirrorSelector for StdinMirrorSelector {
    fn select<'a>(
        &'a self,
        release: &'a Release,
        candidates: &'a MirrorCandidates,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            println!("Select download mirror for patch '{}':", release.display_name());
            for (index, candidate) in candidates.downloadable().enumerate() {
                println!("  [{}] {}", index + 1, candidate.provider);
            }
            for candidate in candidates.iter().filter(|c| !c.downloadable) {
                log::info!("Not offering {}: unsupported link host", candidate.provider);
            }
            println!("Enter a number, or nothing to cancel:");

            let mut line = String::new();
            let mut stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = stdin.read_line(&mut line).await {
                log::warn!("Failed to read mirror choice: {}", e);
                return None;
            }
            parse_choice(&line, candidates)
        })
    }
}

fn parse_choice(input: &str, candidates: &MirrorCandidates) -> Option<String> {
    let index: usize = input.trim().parse().ok()?;
    candidates
        .downloadable()
        .nth(index.checked_sub(1)?)
        .map(|candidate| candidate.url.clone())
}
