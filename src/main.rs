// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # mdoc 服务器入口
//!
//! 读取配置与命令行参数，初始化日志，加载主题并启动 TCP 服务，
//! 收到 Ctrl-C 后停止接收新连接。

use std::{path::Path, process, sync::Arc};

use clap::Parser;
use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{net::TcpListener, runtime::Builder};

use mdoc::{
    config::{parse_listen_addr, Config},
    server, Handler,
};

const LOG_CONFIG: &str = "config/log4rs.yaml";

/// 把一个 Markdown 目录作为网站提供
#[derive(Parser, Debug)]
#[command(name = "mdoc", version, about)]
struct Args {
    /// 监听地址，如 `:3000` 或 `127.0.0.1:8080`
    #[arg(long)]
    addr: Option<String>,

    /// 主题目录
    #[arg(long)]
    theme: Option<String>,

    /// 挂载点
    #[arg(long)]
    root: Option<String>,

    /// 配置文件
    #[arg(long, default_value = "config/development.toml")]
    config: String,

    /// 文档根目录
    dir: Option<String>,
}

fn init_logging() {
    if Path::new(LOG_CONFIG).exists() {
        if let Err(e) = log4rs::init_file(LOG_CONFIG, Default::default()) {
            eprintln!("无法加载日志配置{}：{}", LOG_CONFIG, e);
            process::exit(1);
        }
        return;
    }
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}",
        )))
        .build();
    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志：{}", e);
            }
        }
        Err(e) => eprintln!("无法初始化日志：{}", e),
    }
}

fn main() {
    let args = Args::parse();
    init_logging();

    let mut config = Config::from_toml(&args.config);
    if let Some(dir) = &args.dir {
        config.set_doc_root(dir);
    }
    if let Some(root) = &args.root {
        config.set_mount(root);
    }
    if let Some(theme) = &args.theme {
        config.set_theme(theme);
    }
    let addr = match &args.addr {
        Some(addr) => match parse_listen_addr(addr) {
            Some(addr) => addr,
            None => {
                error!("无法解析监听地址：{}", addr);
                process::exit(1);
            }
        },
        None => config.listen_addr(),
    };
    info!("文档目录：{}", config.doc_root());
    info!("挂载点：{}，主题：{}", config.mount(), config.theme());

    let handler = match Handler::builder(config.doc_root())
        .root(config.mount())
        .theme(config.theme())
        .cache_size(config.cache_size())
        .enable_range_requests(config.enable_range_requests())
        .build()
    {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            error!("无法加载主题：{}", e);
            process::exit(1);
        }
    };

    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            process::exit(1);
        }
    };

    runtime.block_on(async move {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法绑定地址：{}，错误：{}", addr, e);
                process::exit(1);
            }
        };
        info!("服务端在{}上监听Socket连接", addr);
        server::serve(listener, handler, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("无法监听停机信号：{}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
        info!("服务器已停止");
    });
}
