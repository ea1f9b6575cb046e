//! RAG 助手命令行客户端
//!
//! 与检索增强助手对话，并管理支撑它的文档知识库

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use rag_assistant_client::rag::chat::render::render_turn;
use rag_assistant_client::rag::documents::{DeleteConfirmation, FixedAnswer, StatusKind};
use rag_assistant_client::{
    AssistantClient, Category, ClientConfig, ConnectivityStatus, DeleteOutcome, SubmitOutcome,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// RAG 助手命令行客户端
#[derive(Parser, Debug)]
#[command(name = "rag-cli")]
#[command(about = "Chat with a retrieval-augmented assistant and manage its knowledge base", long_about = None)]
struct Args {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 后端地址（覆盖配置文件）
    #[arg(long, env = "RAG_API_URL", global = true)]
    api_url: Option<String>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "warn,rag_assistant_client=info", global = true)]
    log_level: String,

    /// 日志文件
    #[arg(long, default_value = "rag-cli.log", global = true)]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 交互式对话
    Chat {
        /// 恢复已有会话
        #[arg(long)]
        resume: Option<String>,
    },
    /// 单次提问
    Ask { question: String },
    /// 知识库管理
    Docs {
        #[command(subcommand)]
        command: DocsCommand,
    },
    /// 检查后端连通性
    Health {
        /// 持续监控直到 Ctrl+C
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DocsCommand {
    /// 列出知识库中的文档
    List,
    /// 上传文档
    Upload {
        /// 从本地文件导入内容（.txt / .md / .json）
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, default_value = "resume")]
        category: Category,
    },
    /// 载入默认文档到草稿
    LoadDefault {
        /// 载入后立即上传
        #[arg(long)]
        upload: bool,
    },
    /// 删除文档
    Delete {
        id: String,
        /// 跳过确认
        #[arg(long)]
        yes: bool,
    },
}

/// 初始化日志（同时输出到 stderr 和文件）
fn init_logger(log_level: &str, log_file: &PathBuf) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("无法创建日志文件 {}", log_file.display()))?;

    // 控制台输出走 stderr，避免和对话内容混在一起
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(true);

    // 输出到文件，禁用 ANSI 颜色代码
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// 交互式删除确认
struct PromptConfirmation;

#[async_trait::async_trait]
impl DeleteConfirmation for PromptConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    let config = match &args.api_url {
        Some(url) => config.with_api_base_url(url),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

async fn print_status(client: &AssistantClient) {
    if let Some(status) = client.knowledge_base().status().await {
        let icon = match status.kind {
            StatusKind::Loading => "⏳",
            StatusKind::Success => "✅",
            StatusKind::Error => "❌",
        };
        println!("{} {}", icon, status.message);
    }
}

async fn run_chat(client: &AssistantClient, resume: Option<String>) -> Result<()> {
    let session = client.session();
    let excerpt_chars = client.config().excerpt_chars;

    if let Some(id) = resume {
        let restored = session
            .resume(&id)
            .await
            .map_err(|e| anyhow::anyhow!("恢复会话失败: {}", e))?;
        info!("[CLI] 恢复会话 {}，{} 条消息", id, restored);
    }
    println!("{}", session.render().await);
    println!("\n(type /quit to exit, /docs to list documents, /history to reprint the conversation)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::Write::flush(&mut std::io::stdout()).ok();

        let Some(line) = lines.next_line().await.context("读取输入失败")? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                println!("{}", session.render().await);
                continue;
            }
            "/docs" => {
                match client.knowledge_base().list().await {
                    Ok(documents) if documents.is_empty() => {
                        println!("📚 No documents loaded. Upload a document to get started.")
                    }
                    Ok(documents) => {
                        for doc in documents {
                            println!("  • {} ({}, {} chunks)", doc.title, doc.category, doc.chunk_count);
                        }
                    }
                    Err(e) => println!("❌ Failed to load documents: {}", e.detail_or_message()),
                }
                continue;
            }
            _ => {}
        }

        match session.submit(&line).await {
            SubmitOutcome::Replied(turn) | SubmitOutcome::Failed(turn) => {
                println!("{}", render_turn(&turn, excerpt_chars));
            }
            SubmitOutcome::Ignored | SubmitOutcome::Superseded => {}
        }
    }

    if let Some(thread_id) = session.thread_id().await {
        println!("\nConversation id: {} (resume with --resume {})", thread_id, thread_id);
    }
    Ok(())
}

async fn run_ask(client: &AssistantClient, question: &str) -> Result<()> {
    match client.session().submit(question).await {
        SubmitOutcome::Replied(turn) => {
            println!("{}", render_turn(&turn, client.config().excerpt_chars));
            Ok(())
        }
        SubmitOutcome::Failed(turn) => {
            println!("{}", render_turn(&turn, client.config().excerpt_chars));
            anyhow::bail!("聊天请求失败")
        }
        SubmitOutcome::Ignored | SubmitOutcome::Superseded => {
            anyhow::bail!("问题不能为空")
        }
    }
}

async fn run_docs(client: &AssistantClient, command: DocsCommand) -> Result<()> {
    let kb = client.knowledge_base();
    match command {
        DocsCommand::List => {
            let documents = match kb.list().await {
                Ok(documents) => documents,
                Err(e) => {
                    print_status(client).await;
                    return Err(e.into());
                }
            };
            if documents.is_empty() {
                println!("📚 No documents loaded. Upload a document to get started.");
            }
            for doc in documents {
                println!(
                    "{}  {:<40}  {:<8}  {:>4} chunks  {}",
                    doc.id,
                    doc.title,
                    doc.category,
                    doc.chunk_count,
                    doc.created_at.format("%Y-%m-%d")
                );
            }
        }
        DocsCommand::Upload {
            file,
            title,
            content,
            category,
        } => {
            if let Some(title) = title {
                kb.set_title(title).await;
            }
            if let Some(content) = content {
                kb.set_content(content).await;
            }
            kb.set_category(category).await;
            if let Some(path) = file {
                kb.import_file(&path).await?;
            }

            let result = kb.upload().await;
            print_status(client).await;
            let doc = result?;
            println!("   Document ID: {}", doc.id);
            println!("   Title: {}", doc.title);
            println!("   Chunks created: {}", doc.chunk_count);
            println!("   Category: {}", doc.category);
        }
        DocsCommand::LoadDefault { upload } => {
            let result = kb.load_default().await;
            print_status(client).await;
            result?;
            let draft = kb.draft().await;
            println!(
                "   Draft: {} ({}, {} characters)",
                draft.title,
                draft.category,
                draft.content.chars().count()
            );
            if upload {
                let result = kb.upload().await;
                print_status(client).await;
                let doc = result?;
                println!("   Document ID: {} ({} chunks)", doc.id, doc.chunk_count);
            }
        }
        DocsCommand::Delete { id, yes } => {
            // 确认提示需要文档标题
            let title = match kb.list().await {
                Ok(documents) => documents
                    .into_iter()
                    .find(|d| d.id == id)
                    .map(|d| d.title)
                    .unwrap_or_else(|| id.clone()),
                Err(_) => id.clone(),
            };
            let outcome = if yes {
                kb.delete(&id, &title, &FixedAnswer(true)).await
            } else {
                kb.delete(&id, &title, &PromptConfirmation).await
            };
            print_status(client).await;
            if outcome? == DeleteOutcome::Declined {
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}

async fn run_health(client: &AssistantClient, watch: bool) -> Result<()> {
    let monitor = client.monitor();
    if !watch {
        let status = monitor.check_now().await;
        println!("{}", status);
        if let Ok(info) = monitor.service_info().await {
            println!("  Service: {} {} ({})", info.service, info.version, info.status);
        }
        if let ConnectivityStatus::Error(_) = status {
            anyhow::bail!("后端不可用");
        }
        return Ok(());
    }

    let mut rx = monitor.subscribe();
    monitor.start().await;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = rx.borrow_and_update().clone();
                println!("{}", status);
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
    monitor.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level, &args.log_file)?;

    let config = load_config(&args)?;
    info!("[CLI] 🚀 RAG 助手客户端，后端: {}", config.api_base_url);
    let client = AssistantClient::new(config)?;

    let result = match args.command {
        Command::Chat { resume } => run_chat(&client, resume).await,
        Command::Ask { question } => run_ask(&client, &question).await,
        Command::Docs { command } => run_docs(&client, command).await,
        Command::Health { watch } => run_health(&client, watch).await,
    };

    if let Err(e) = &result {
        error!("[CLI] ❌ {:#}", e);
    }
    result
}
