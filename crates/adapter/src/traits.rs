use anyhow::Result;
use async_trait::async_trait;
use domain::Reply;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ChatDriver: Send + Sync {
    async fn run(&self, cancel_token: CancellationToken) -> Result<()>;
}

// 表单循环与平台解耦的缝：发一条消息 / 等下一条回复
#[async_trait]
pub trait Conversation: Send {
    async fn say(&mut self, text: &str) -> Result<()>;

    /// None 表示等待超时
    async fn wait_reply(&mut self) -> Result<Option<Reply>>;
}
