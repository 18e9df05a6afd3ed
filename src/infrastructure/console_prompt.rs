//! 控制台决策应答 - 基础设施层
//!
//! 持有标准输入，逐个应答单评卷人决策请求：
//! - `1` 由评卷人本人复核
//! - `2` 指定另一位复核人（随后输入复核人ID，空行视为取消）
//! - `3` 跳过该文件
//!
//! 标准输入结束时，当前及之后的请求一律按取消处理。

use crate::services::decision::{Decision, DecisionRequest, SingleEvaluatorPrompt};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 在后台任务中用标准输入/输出应答请求
pub fn spawn_console_responder(requests: mpsc::Receiver<DecisionRequest>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let input = BufReader::new(io::stdin());
        if let Err(err) = serve_requests(requests, input, io::stdout()).await {
            warn!("⚠️ 控制台应答异常结束: {}", err);
        }
    })
}

/// 逐个应答请求，直到通道关闭
pub async fn serve_requests<R, W>(
    mut requests: mpsc::Receiver<DecisionRequest>,
    input: R,
    mut output: W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(request) = requests.recv().await {
        write_prompt(&mut output, &request.prompt).await?;

        let decision = match lines.next_line().await?.as_deref().map(str::trim) {
            Some("1") => Decision::Same,
            Some("2") => {
                output.write_all("请输入复核人ID（留空取消）: ".as_bytes()).await?;
                output.flush().await?;
                match lines.next_line().await? {
                    Some(moderator) => Decision::Different(moderator),
                    None => Decision::DifferentCancelled,
                }
            }
            Some(other) => {
                if other != "3" {
                    warn!("⚠️ 无法识别的输入 \"{}\"，按跳过处理", other);
                }
                Decision::Cancel
            }
            None => Decision::Cancel,
        };

        debug!("[{}] 控制台决定: {:?}", request.prompt.file_name, decision);
        if request.reply.send(decision).is_err() {
            warn!("⚠️ [{}] 请求方已不再等待答复", request.prompt.file_name);
        }
    }

    Ok(())
}

async fn write_prompt<W: AsyncWrite + Unpin>(
    output: &mut W,
    prompt: &SingleEvaluatorPrompt,
) -> io::Result<()> {
    let text = format!(
        "\n{}\n⚠️ 文件 {} 只有一位评卷人: {}（抽中 {} 份）\n没有可用的其他复核人，请选择：\n  1) 由该评卷人复核\n  2) 指定其他复核人\n  3) 跳过该文件\n> ",
        "─".repeat(60),
        prompt.file_name,
        prompt.evaluator,
        prompt.booklets.len()
    );
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
