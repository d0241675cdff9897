pub mod inline_object;
pub mod playback_page;
pub mod remote_api;
pub mod script_array;
pub mod unimplemented;

pub use inline_object::InlineObjectResolver;
pub use playback_page::PlaybackPageResolver;
pub use remote_api::RemoteApiResolver;
pub use script_array::ScriptArrayResolver;
pub use unimplemented::UnimplementedResolver;

use crate::core::Registry;
use crate::fetch::PageFetcher;
use crate::sandbox::CodeRunner;
use anyhow::Result;
use std::sync::Arc;

/// Every supported host, in the order dispatch tries them.
pub fn standard_registry(fetcher: Arc<dyn PageFetcher>, runner: Arc<dyn CodeRunner>) -> Result<Registry> {
    Registry::builder()
        .register(
            "streamani.net",
            ScriptArrayResolver::new(fetcher.clone(), runner.clone()),
        )
        .register(
            "sbplay.one",
            PlaybackPageResolver::new(fetcher.clone(), runner.clone()),
        )
        .register(
            "mixdrop.co",
            InlineObjectResolver::mixdrop(fetcher.clone(), runner),
        )
        .register("embedsito.com", RemoteApiResolver::new(fetcher))
        .register("www.mp4upload.com", UnimplementedResolver::new("mp4upload"))
        .build()
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeFetcher, FakeRunner};
    use super::*;

    #[test]
    fn test_standard_registry_order() {
        let registry = standard_registry(
            Arc::new(FakeFetcher::default()),
            Arc::new(FakeRunner::printing("")),
        )
        .unwrap();

        assert_eq!(
            registry.hostnames(),
            vec![
                "streamani.net",
                "sbplay.one",
                "mixdrop.co",
                "embedsito.com",
                "www.mp4upload.com",
            ]
        );
    }
}
