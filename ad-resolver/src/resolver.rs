//! Delayed-link resolution.
//!
//! Per link: unlock, pick the first stream quality, request it, then poll the
//! delayed job until it is ready, fails, or the poll budget runs out. The
//! collaborator's session is released exactly once per call, whatever the
//! outcome, including when the returned future is dropped mid-poll.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use ad_api::DelayedState;
use ad_core::config::ResolverConfig;
use ad_core::constants::polling;
use ad_core::error::{AdError, AdResult};

use crate::source::DelayedLinkApi;

/// Budget for polling one delayed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status polls. Must be positive.
    pub max_attempts: u32,
    /// Pause between two polls.
    pub retry_delay: Duration,
    /// Wall-clock budget of the poll phase.
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: polling::DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(polling::DEFAULT_RETRY_DELAY_SECS),
            max_delay: Duration::from_secs(polling::DEFAULT_MAX_DELAY_SECS),
        }
    }
}

impl From<&ResolverConfig> for PollPolicy {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl PollPolicy {
    pub fn validate(&self) -> AdResult<()> {
        if self.max_attempts == 0 {
            return Err(AdError::InvalidInput("max_attempts must be positive".into()));
        }
        Ok(())
    }
}

/// Result of [`Resolver::resolve_many`].
///
/// A single input link yields `One`, anything longer yields `Many` in input
/// order.
#[derive(Debug)]
pub enum Resolution {
    One(AdResult<String>),
    Many(Vec<AdResult<String>>),
}

impl Resolution {
    /// Flatten into a list of outcomes in input order.
    pub fn into_vec(self) -> Vec<AdResult<String>> {
        match self {
            Resolution::One(outcome) => vec![outcome],
            Resolution::Many(outcomes) => outcomes,
        }
    }
}

/// Calls `release()` on the collaborator when dropped.
struct ReleaseGuard<'a, A: DelayedLinkApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: DelayedLinkApi + ?Sized> ReleaseGuard<'a, A> {
    fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: DelayedLinkApi + ?Sized> Drop for ReleaseGuard<'_, A> {
    fn drop(&mut self) {
        self.api.release();
    }
}

/// Resolves hoster links into direct stream URLs.
pub struct Resolver<A> {
    api: A,
    policy: PollPolicy,
}

impl<A: DelayedLinkApi> Resolver<A> {
    /// Create a resolver. Fails with `InvalidInput` when `max_attempts` is zero.
    pub fn new(api: A, policy: PollPolicy) -> AdResult<Self> {
        policy.validate()?;
        Ok(Self { api, policy })
    }

    /// Resolve one link into a direct URL.
    pub async fn resolve(&self, link: &str) -> AdResult<String> {
        let link = validate_link(link)?;
        let _release = ReleaseGuard::new(&self.api);
        self.resolve_one(link).await
    }

    /// Resolve several links, one after the other.
    ///
    /// Input is validated up front; a failing link does not stop the rest.
    /// The session is released once, after the last link.
    pub async fn resolve_many<S: AsRef<str>>(&self, links: &[S]) -> AdResult<Resolution> {
        if links.is_empty() {
            return Err(AdError::InvalidInput("no links to resolve".into()));
        }
        let links = links
            .iter()
            .map(|l| validate_link(l.as_ref()))
            .collect::<AdResult<Vec<_>>>()?;

        let _release = ReleaseGuard::new(&self.api);
        let mut outcomes = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            debug!("resolving link {}/{}", i + 1, links.len());
            let outcome = self.resolve_one(link).await;
            if let Err(e) = &outcome {
                warn!("failed to resolve {}: {}", link, e);
            }
            outcomes.push(outcome);
        }

        Ok(match outcomes.len() {
            1 => Resolution::One(outcomes.remove(0)),
            _ => Resolution::Many(outcomes),
        })
    }

    async fn resolve_one(&self, link: &str) -> AdResult<String> {
        let unlocked = self.api.unlock(link).await?;
        let stream = unlocked
            .streams
            .first()
            .ok_or_else(|| AdError::NoStreamsAvailable { link: link.to_string() })?;
        debug!("requesting stream {} ({}) for {}", stream.id, stream.label(), link);

        let request = self.api.request_stream(link, &unlocked.id, &stream.id).await?;
        let delayed_id = match (request.delayed, request.link) {
            (Some(id), _) if !id.trim().is_empty() => id,
            (_, Some(url)) if !url.trim().is_empty() => {
                info!("stream for {} available without delay", link);
                return Ok(url);
            }
            _ => {
                return Err(AdError::Serialization(
                    "stream response carries neither a delayed id nor a link".into(),
                ))
            }
        };

        self.poll(&delayed_id).await
    }

    async fn poll(&self, delayed_id: &str) -> AdResult<String> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let status = self.api.poll_delayed(delayed_id).await?;
            if !status.is_known_status() {
                warn!("unknown delayed status {} for job {}, treating as pending", status.status, delayed_id);
            }

            match status.state() {
                DelayedState::Ready(url) => {
                    info!("delayed job {} ready after {} polls", delayed_id, attempts);
                    return Ok(url);
                }
                DelayedState::Failed => {
                    return Err(AdError::DelayedJobFailed {
                        delayed_id: delayed_id.to_string(),
                    });
                }
                DelayedState::Pending => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= self.policy.max_delay {
                return Err(AdError::PollTimeout { elapsed, attempts });
            }
            if attempts >= self.policy.max_attempts {
                return Err(AdError::AttemptsExhausted { attempts });
            }

            debug!(
                "delayed job {} pending (poll {}/{}, time left {:?})",
                delayed_id, attempts, self.policy.max_attempts, status.time_left
            );
            tokio::time::sleep(self.policy.retry_delay).await;
        }
    }
}

fn validate_link(link: &str) -> AdResult<&str> {
    let link = link.trim();
    if link.is_empty() {
        return Err(AdError::InvalidInput("link must not be empty".into()));
    }
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use ad_api::{DelayedLink, StreamQuality, StreamRequest, UnlockedLink};
    use async_trait::async_trait;

    enum StreamReply {
        Delayed(&'static str),
        Direct(&'static str),
        Empty,
        Error(&'static str),
    }

    enum PollReply {
        Status(i64, Option<&'static str>),
        Transport,
    }

    /// Scripted collaborator that counts every call.
    struct StubApi {
        unlock_error: bool,
        streams: Vec<&'static str>,
        stream_reply: StreamReply,
        polls: Mutex<VecDeque<PollReply>>,
        unlock_calls: AtomicU32,
        stream_calls: AtomicU32,
        poll_calls: AtomicU32,
        release_calls: AtomicU32,
    }

    impl StubApi {
        fn new(polls: Vec<PollReply>) -> Self {
            Self {
                unlock_error: false,
                streams: vec!["mp4-1080", "mp4-720"],
                stream_reply: StreamReply::Delayed("job-1"),
                polls: Mutex::new(polls.into()),
                unlock_calls: AtomicU32::new(0),
                stream_calls: AtomicU32::new(0),
                poll_calls: AtomicU32::new(0),
                release_calls: AtomicU32::new(0),
            }
        }

        fn always_pending() -> Self {
            Self::new(Vec::new())
        }

        fn calls(&self) -> (u32, u32, u32, u32) {
            (
                self.unlock_calls.load(Ordering::SeqCst),
                self.stream_calls.load(Ordering::SeqCst),
                self.poll_calls.load(Ordering::SeqCst),
                self.release_calls.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl DelayedLinkApi for StubApi {
        async fn unlock(&self, link: &str) -> AdResult<UnlockedLink> {
            self.unlock_calls.fetch_add(1, Ordering::SeqCst);
            if self.unlock_error {
                return Err(AdError::api("LINK_HOST_NOT_SUPPORTED", "This host or link is not supported"));
            }
            Ok(UnlockedLink {
                id: format!("gen-{link}"),
                link: None,
                host: Some("stub".into()),
                filename: Some("video.mp4".into()),
                filesize: None,
                streams: self
                    .streams
                    .iter()
                    .map(|id| StreamQuality {
                        id: id.to_string(),
                        ext: Some("mp4".into()),
                        quality: None,
                        filesize: None,
                        name: None,
                    })
                    .collect(),
                delayed: None,
            })
        }

        async fn request_stream(&self, _link: &str, _id: &str, stream_id: &str) -> AdResult<StreamRequest> {
            self.stream_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(stream_id, self.streams[0], "first stream must be requested");
            let (delayed, link) = match self.stream_reply {
                StreamReply::Delayed(id) => (Some(id.to_string()), None),
                StreamReply::Direct(url) => (None, Some(url.to_string())),
                StreamReply::Empty => (None, None),
                StreamReply::Error(code) => return Err(AdError::api(code, "stream request rejected")),
            };
            Ok(StreamRequest { delayed, link, filename: None, filesize: None })
        }

        async fn poll_delayed(&self, _delayed_id: &str) -> AdResult<DelayedLink> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.polls.lock().unwrap().pop_front();
            match next.unwrap_or(PollReply::Status(1, None)) {
                PollReply::Status(status, link) => Ok(DelayedLink {
                    status,
                    time_left: Some(10),
                    link: link.map(str::to_string),
                }),
                PollReply::Transport => Err(AdError::Http("connection reset".into())),
            }
        }

        fn release(&self) {
            self.release_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn policy(max_attempts: u32, retry_delay_secs: u64, max_delay_secs: u64) -> PollPolicy {
        PollPolicy {
            max_attempts,
            retry_delay: Duration::from_secs(retry_delay_secs),
            max_delay: Duration::from_secs(max_delay_secs),
        }
    }

    fn resolver(stub: &Arc<StubApi>, policy: PollPolicy) -> Resolver<Arc<StubApi>> {
        Resolver::new(Arc::clone(stub), policy).unwrap()
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let stub = Arc::new(StubApi::always_pending());
        let result = Resolver::new(stub, policy(0, 1, 10));
        assert!(matches!(result, Err(AdError::InvalidInput(_))));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ResolverConfig {
            max_attempts: 7,
            retry_delay_secs: 2,
            max_delay_secs: 20,
        };
        assert_eq!(PollPolicy::from(&config), policy(7, 2, 20));
        assert_eq!(PollPolicy::default(), policy(5, 3, 30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_ready_sleeps_once() {
        let stub = Arc::new(StubApi::new(vec![
            PollReply::Status(1, None),
            PollReply::Status(2, Some("https://dl.example/video.mp4")),
        ]));
        let r = resolver(&stub, policy(5, 3, 30));

        let start = Instant::now();
        let url = r.resolve("https://host/video").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(url, "https://dl.example/video.mp4");
        assert_eq!(stub.calls(), (1, 1, 2, 1));
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_streams_stops_after_unlock() {
        let mut stub = StubApi::always_pending();
        stub.streams.clear();
        let stub = Arc::new(stub);
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/file").await.unwrap_err();
        assert!(matches!(err, AdError::NoStreamsAvailable { ref link } if link == "https://host/file"));
        assert_eq!(stub.calls(), (1, 0, 0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_exhausted_after_exact_polls() {
        let stub = Arc::new(StubApi::always_pending());
        let r = resolver(&stub, policy(3, 1, 1000));

        let err = r.resolve("https://host/video").await.unwrap_err();
        assert!(matches!(err, AdError::AttemptsExhausted { attempts: 3 }));
        assert_eq!(stub.calls(), (1, 1, 3, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_budget_times_out_after_one_poll() {
        let stub = Arc::new(StubApi::always_pending());
        let r = resolver(&stub, policy(1000, 1, 0));

        let err = r.resolve("https://host/video").await.unwrap_err();
        assert!(matches!(err, AdError::PollTimeout { attempts: 1, .. }));
        assert!(stub.poll_calls.load(Ordering::SeqCst) <= 1);
        assert_eq!(stub.release_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_budget_bounds_polls() {
        let stub = Arc::new(StubApi::always_pending());
        let r = resolver(&stub, policy(1000, 3, 10));

        let err = r.resolve("https://host/video").await.unwrap_err();
        // Polls at t=0, 3, 6, 9, 12; the last one is past the budget.
        assert!(matches!(err, AdError::PollTimeout { attempts: 5, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_status() {
        let stub = Arc::new(StubApi::new(vec![PollReply::Status(1, None), PollReply::Status(3, None)]));
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/video").await.unwrap_err();
        assert!(matches!(err, AdError::DelayedJobFailed { ref delayed_id } if delayed_id == "job-1"));
        assert_eq!(stub.calls(), (1, 1, 2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_is_pending() {
        let stub = Arc::new(StubApi::new(vec![
            PollReply::Status(9, None),
            PollReply::Status(2, Some("https://dl.example/x")),
        ]));
        let r = resolver(&stub, PollPolicy::default());
        assert_eq!(r.resolve("https://host/x").await.unwrap(), "https://dl.example/x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_link_skips_polling() {
        let mut stub = StubApi::always_pending();
        stub.stream_reply = StreamReply::Direct("https://dl.example/direct");
        let stub = Arc::new(stub);
        let r = resolver(&stub, PollPolicy::default());

        assert_eq!(r.resolve("https://host/x").await.unwrap(), "https://dl.example/direct");
        assert_eq!(stub.calls(), (1, 1, 0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stream_response_is_malformed() {
        let mut stub = StubApi::always_pending();
        stub.stream_reply = StreamReply::Empty;
        let stub = Arc::new(stub);
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/x").await.unwrap_err();
        assert!(matches!(err, AdError::Serialization(_)));
        assert_eq!(stub.release_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_propagates_and_releases() {
        let mut stub = StubApi::always_pending();
        stub.unlock_error = true;
        let stub = Arc::new(stub);
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/x").await.unwrap_err();
        assert_eq!(err.api_code(), Some("LINK_HOST_NOT_SUPPORTED"));
        assert_eq!(stub.calls(), (1, 0, 0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_request_error_propagates_without_polling() {
        let mut stub = StubApi::always_pending();
        stub.stream_reply = StreamReply::Error("STREAM_INVALID_GEN_ID");
        let stub = Arc::new(stub);
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/x").await.unwrap_err();
        assert_eq!(err.api_code(), Some("STREAM_INVALID_GEN_ID"));
        // one unlock, one stream request, no polls, one release
        assert_eq!(stub.calls(), (1, 1, 0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_during_poll_releases() {
        let stub = Arc::new(StubApi::new(vec![PollReply::Status(1, None), PollReply::Transport]));
        let r = resolver(&stub, PollPolicy::default());

        let err = r.resolve("https://host/x").await.unwrap_err();
        assert!(matches!(err, AdError::Http(_)));
        assert_eq!(stub.calls(), (1, 1, 2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_future_releases_once() {
        let stub = Arc::new(StubApi::always_pending());
        let r = resolver(&stub, policy(1000, 10, 1000));

        let result = tokio::time::timeout(Duration::from_secs(15), r.resolve("https://host/x")).await;
        assert!(result.is_err());
        assert_eq!(stub.release_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.poll_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_makes_no_calls() {
        let stub = Arc::new(StubApi::always_pending());
        let r = resolver(&stub, PollPolicy::default());

        assert!(matches!(r.resolve("   ").await, Err(AdError::InvalidInput(_))));
        let none: [&str; 0] = [];
        assert!(matches!(r.resolve_many(&none).await, Err(AdError::InvalidInput(_))));
        assert!(matches!(
            r.resolve_many(&["https://host/a", ""]).await,
            Err(AdError::InvalidInput(_))
        ));
        assert_eq!(stub.calls(), (0, 0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_single_link_is_one() {
        let stub = Arc::new(StubApi::new(vec![PollReply::Status(2, Some("https://dl.example/a"))]));
        let r = resolver(&stub, PollPolicy::default());

        match r.resolve_many(&["https://host/a"]).await.unwrap() {
            Resolution::One(Ok(url)) => assert_eq!(url, "https://dl.example/a"),
            other => panic!("expected a single outcome, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_preserves_order() {
        let stub = Arc::new(StubApi::new(vec![
            PollReply::Status(2, Some("https://dl.example/a")),
            PollReply::Status(3, None),
        ]));
        let r = resolver(&stub, PollPolicy::default());

        let outcomes = match r.resolve_many(&["https://host/a", "https://host/b"]).await.unwrap() {
            Resolution::Many(outcomes) => outcomes,
            other => panic!("expected many outcomes, got {other:?}"),
        };
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].as_ref().unwrap(), "https://dl.example/a");
        assert!(matches!(outcomes[1], Err(AdError::DelayedJobFailed { .. })));
        assert_eq!(stub.calls(), (2, 2, 2, 1));
    }
}
