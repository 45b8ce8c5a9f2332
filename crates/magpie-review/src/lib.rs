//! Gitea webhook handling and LLM completion for review automation.
//!
//! Provides the integration surface the review pipeline is built on:
//! webhook event handlers that talk to the Gitea REST API
//! ([`gitea::PullRequestHandler`], [`gitea::PushHandler`]), change
//! filtering ([`filter::filter_changes`]), and an OpenAI-compatible
//! chat-completion client ([`llm::LlmClient`]).

pub mod filter;
pub mod gitea;
pub mod llm;
