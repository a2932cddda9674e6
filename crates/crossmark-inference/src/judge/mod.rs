//! LLM-as-judge building blocks: prompt, endpoint shapes and reply parsing.

pub mod endpoint;
pub mod prompt;
pub mod reply;

pub use endpoint::{JudgeEndpoint, RequestParams};
pub use prompt::{build_match_prompt, SYSTEM_PROMPT};
pub use reply::{parse_judge_reply, JudgeReply, ReplyError, NO_REASON};
