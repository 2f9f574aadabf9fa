//! BoxChatPoster -- object-safe dynamic dispatch wrapper for ChatPoster.

use std::future::Future;
use std::pin::Pin;

use threadline_types::error::PostError;
use threadline_types::message::Message;

use super::poster::ChatPoster;

type PostFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PostError>> + Send + 'a>>;

/// Object-safe version of [`ChatPoster`] with boxed futures.
pub trait ChatPosterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn post_message_boxed<'a>(&'a self, reply: &'a Message) -> PostFuture<'a>;

    fn post_actionable_message_boxed<'a>(&'a self, reply: &'a Message) -> PostFuture<'a>;
}

impl<T: ChatPoster> ChatPosterDyn for T {
    fn name(&self) -> &str {
        ChatPoster::name(self)
    }

    fn post_message_boxed<'a>(&'a self, reply: &'a Message) -> PostFuture<'a> {
        Box::pin(self.post_message(reply))
    }

    fn post_actionable_message_boxed<'a>(&'a self, reply: &'a Message) -> PostFuture<'a> {
        Box::pin(self.post_actionable_message(reply))
    }
}

/// Type-erased chat poster.
pub struct BoxChatPoster {
    inner: Box<dyn ChatPosterDyn + Send + Sync>,
}

impl BoxChatPoster {
    pub fn new<T: ChatPoster + 'static>(poster: T) -> Self {
        Self {
            inner: Box::new(poster),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn post_message(&self, reply: &Message) -> Result<(), PostError> {
        self.inner.post_message_boxed(reply).await
    }

    pub async fn post_actionable_message(&self, reply: &Message) -> Result<(), PostError> {
        self.inner.post_actionable_message_boxed(reply).await
    }
}
