// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # TCP 服务
//!
//! 接收连接并为每个连接启动一个任务：读取请求头、解析为 `Request`、
//! 在阻塞线程池中执行 `Handler::serve`，然后写回响应并关闭连接。

use std::{future::Future, sync::Arc, time::Instant};

use log::{debug, error, info};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task,
};

use crate::{exception::Exception, handler::Handler, request::Request, response::Response};

/// 请求头的最大长度
pub const MAX_HEADER_SIZE: usize = 8 * 1024;

/// 在 `listener` 上持续接收连接，直到 `shutdown` 完成。
pub async fn serve<F>(listener: TcpListener, handler: Arc<Handler>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut id: u128 = 0;
    loop {
        let accepted = tokio::select! {
            _ = &mut shutdown => {
                info!("收到停机信号，停止接收新连接");
                break;
            }
            accepted = listener.accept() => accepted,
        };
        let (mut stream, addr) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                error!("接收TCP连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]TCP连接已建立：{}", id, addr);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, handler).await;
        });
        id += 1;
    }
}

/// 读取直到空行（请求头结束）、对端关闭或超过 `MAX_HEADER_SIZE`。
async fn read_head(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_HEADER_SIZE {
            break;
        }
    }
    Ok(buffer)
}

async fn handle_connection(stream: &mut TcpStream, id: u128, handler: Arc<Handler>) {
    let buffer = match read_head(stream).await {
        Ok(buffer) if buffer.is_empty() => return,
        Ok(buffer) => buffer,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误：{}", id, e);
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕", id);
    let start_time = Instant::now();

    let response = match Request::try_from(&buffer, id) {
        Ok(request) => {
            let response = {
                let handler = Arc::clone(&handler);
                let request = request.clone();
                task::spawn_blocking(move || handler.serve(&request)).await
            };
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    error!("[ID{}]请求处理任务异常退出：{}", id, e);
                    Response::plain_error(500)
                }
            };
            info!(
                "[ID{}] {}, {}, {}, {}, {}, {}",
                id,
                request.version(),
                request.path(),
                request.method(),
                response.status_code(),
                response.information(),
                request.user_agent(),
            );
            response
        }
        Err(e) => {
            let code = match e {
                Exception::UnSupportedRequestMethod => 405,
                Exception::UnsupportedHttpVersion => 505,
                _ => 400,
            };
            info!("[ID{}] 无法解析的请求，返回{}", id, code);
            Response::plain_error(code)
        }
    };
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    let bytes = response.as_bytes();
    if let Err(e) = stream.write_all(&bytes).await {
        error!("[ID{}]发送响应失败：{}", id, e);
        return;
    }
    let _ = stream.flush().await;
}
