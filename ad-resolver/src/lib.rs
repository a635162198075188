//! AllDebrid resolver - turns a hoster link into a direct stream URL.
//!
//! Stream-only hosts hand out a delayed job instead of a direct link. The
//! [`Resolver`] unlocks the link, requests the first stream quality and polls
//! the delayed job within a bounded budget of attempts and wall-clock time.

pub mod resolver;
pub mod source;

pub use resolver::{PollPolicy, Resolution, Resolver};
pub use source::DelayedLinkApi;
