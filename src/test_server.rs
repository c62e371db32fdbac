//! 单次应答的本地HTTP服务，用于测试真实的请求报文

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// 收到的原始请求
pub struct CapturedRequest {
    /// 请求行与头部，头部名称已转为小写
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key == name).then(|| value.trim())
        })
    }
}

/// 在随机端口上接受一个连接，返回固定状态码与响应体
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let body = body.to_string();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "连接在头部结束前关闭");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
        let head = head
            .lines()
            .enumerate()
            .map(|(i, line)| match line.split_once(':') {
                Some((key, value)) if i > 0 => format!("{}:{}", key.to_ascii_lowercase(), value),
                _ => line.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let request = CapturedRequest { head, body: String::new() };
        let content_length: usize = request
            .header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let mut payload = raw[head_end + 4..].to_vec();
        while payload.len() < content_length {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            payload.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        CapturedRequest {
            body: String::from_utf8_lossy(&payload).to_string(),
            ..request
        }
    });

    (base, handle)
}
