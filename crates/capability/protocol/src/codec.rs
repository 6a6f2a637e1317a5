//! 命令编解码
//!
//! - 编码：把存储的命令描述（十六进制串或文本）转换为可发送的 [`Frame`]
//! - 分类：把驱动返回的原始结果归类为 SUCCESS / FAIL / TIMEOUT
//!
//! 载荷编码方式由预设协议决定：
//!
//! | 协议 | 载荷 | 帧 |
//! |------|------|----|
//! | TCP / UDP | 十六进制 | `Frame::Bytes` |
//! | RS232 | 文本 | `Frame::Line` |
//! | HTTP | `[METHOD ]path[ body]` | `Frame::Http` |
//! | WOL | 忽略，使用设备 MAC | `Frame::MagicPacket` |

use crate::error::{EncodingError, TransportError};
use crate::types::{Classification, Delivery, Frame, HttpRequestSpec, TransportReply};
use domain::Protocol;

/// ASCII NAK，设备否定应答
const NAK: u8 = 0x15;

/// 结果说明最大字符数
const MAX_SUMMARY_CHARS: usize = 200;

const HTTP_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"];

/// 按协议编码命令载荷。
///
/// `hardware_address` 仅 WOL 使用。
pub fn encode(
    protocol: Protocol,
    spec: &str,
    hardware_address: Option<&str>,
) -> Result<Frame, EncodingError> {
    match protocol {
        Protocol::Tcp | Protocol::Udp => parse_hex(spec).map(Frame::Bytes),
        Protocol::Rs232 => decode_text(spec).map(Frame::Line),
        Protocol::Http => parse_http_spec(spec).map(Frame::Http),
        Protocol::Wol => {
            let mac = hardware_address
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or(EncodingError::MissingHardwareAddress)?;
            magic_packet(mac).map(Frame::MagicPacket)
        }
    }
}

/// 命令创建/更新时的载荷校验。
///
/// WOL 不使用载荷，恒为通过；MAC 在分派时按设备校验。
pub fn validate(protocol: Protocol, spec: &str) -> Result<(), EncodingError> {
    match protocol {
        Protocol::Wol => Ok(()),
        _ => encode(protocol, spec, None).map(|_| ()),
    }
}

/// 解析十六进制载荷。
///
/// 允许空白、逗号分隔与 `0x` 前缀，大小写不敏感：
/// `"A5 5A 01"`、`"a55a01"`、`"0xA5,0x5A,0x01"` 等价。
pub fn parse_hex(spec: &str) -> Result<Vec<u8>, EncodingError> {
    let normalized = spec.replace(',', " ");
    let mut bytes = Vec::new();
    for token in normalized.split_whitespace() {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EncodingError::InvalidHexToken(token.to_string()));
        }
        if digits.len() % 2 != 0 {
            return Err(EncodingError::OddLength(token.to_string()));
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair)
                .map_err(|_| EncodingError::InvalidHexToken(token.to_string()))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| EncodingError::InvalidHexToken(token.to_string()))?;
            bytes.push(byte);
        }
    }
    if bytes.is_empty() {
        return Err(EncodingError::Empty);
    }
    Ok(bytes)
}

/// 以规范形式（大写、空格分隔）渲染字节。
pub fn render_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 解码文本载荷，处理 `\r` `\n` `\t` `\\` 转义。
pub fn decode_text(spec: &str) -> Result<String, EncodingError> {
    if spec.trim().is_empty() {
        return Err(EncodingError::Empty);
    }
    let mut out = String::with_capacity(spec.len());
    let mut chars = spec.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

/// 解析 HTTP 载荷：`[METHOD ]path[ body]`，方法缺省为 GET。
pub fn parse_http_spec(spec: &str) -> Result<HttpRequestSpec, EncodingError> {
    let text = decode_text(spec)?;
    let text = text.trim_start();
    let (first, rest) = split_token(text);
    let upper = first.to_ascii_uppercase();
    let (method, rest) = if HTTP_METHODS.contains(&upper.as_str()) {
        (upper, rest)
    } else {
        ("GET".to_string(), text)
    };
    let (path, body) = split_token(rest.trim_start());
    if path.is_empty() {
        return Err(EncodingError::InvalidHttpSpec("missing path".to_string()));
    }
    if path.contains("://") {
        return Err(EncodingError::InvalidHttpSpec(format!(
            "expected a path, got url `{path}`"
        )));
    }
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let body = body.trim();
    Ok(HttpRequestSpec {
        method,
        path,
        body: (!body.is_empty()).then(|| body.to_string()),
    })
}

fn split_token(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], &text[idx..]),
        None => (text, ""),
    }
}

/// 解析 MAC 地址（`:` `-` `.` 分隔或无分隔）。
pub fn parse_hardware_address(mac: &str) -> Result<[u8; 6], EncodingError> {
    let digits: String = mac
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EncodingError::InvalidHardwareAddress(mac.to_string()));
    }
    let mut out = [0u8; 6];
    for (idx, slot) in out.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&digits[idx * 2..idx * 2 + 2], 16)
            .map_err(|_| EncodingError::InvalidHardwareAddress(mac.to_string()))?;
    }
    Ok(out)
}

/// 构造 WOL 魔术包：6 个 `0xFF` + 16 次重复 MAC。
pub fn magic_packet(mac: &str) -> Result<Vec<u8>, EncodingError> {
    let mac = parse_hardware_address(mac)?;
    let mut packet = Vec::with_capacity(102);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&mac);
    }
    Ok(packet)
}

/// 设备应答摘要：可打印文本直接截断输出，否则输出十六进制。
pub fn summarize_response(bytes: &[u8]) -> String {
    let rendered = match std::str::from_utf8(bytes) {
        Ok(text)
            if text
                .chars()
                .all(|c| !c.is_control() || matches!(c, '\r' | '\n' | '\t')) =>
        {
            text.trim().to_string()
        }
        _ => render_hex(bytes),
    };
    truncate_chars(&rendered, MAX_SUMMARY_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// 将驱动结果归类为三态之一。
///
/// TIMEOUT 与 FAIL 严格区分：前者表示结果未知，后者表示结果已知为否定。
pub fn classify(
    protocol: Protocol,
    result: &Result<TransportReply, TransportError>,
) -> Classification {
    let reply = match result {
        Ok(reply) => reply,
        Err(TransportError::Timeout(ms)) => {
            return Classification::timeout(format!("no response within {ms} ms"));
        }
        Err(err) => return Classification::fail(err.to_string()),
    };

    let summary = reply
        .response
        .as_deref()
        .filter(|bytes| !bytes.is_empty())
        .map(summarize_response);

    if let Some(code) = reply.status_code {
        let detail = summary.unwrap_or_else(|| "empty body".to_string());
        return if (200..300).contains(&code) {
            Classification::success(format!("HTTP {code}: {detail}"))
        } else {
            Classification::fail(format!("HTTP {code}: {detail}"))
        };
    }

    match reply.delivery {
        Delivery::FireAndForget => match protocol {
            Protocol::Wol => Classification::success(
                "magic packet sent (fire-and-forget, power-on not confirmed)",
            ),
            _ => Classification::success(format!(
                "{protocol} datagram sent (fire-and-forget, delivery not confirmed)"
            )),
        },
        Delivery::WrittenNoReply => {
            Classification::success("command sent, no reply from device")
        }
        Delivery::Replied => {
            let is_nak = reply
                .response
                .as_deref()
                .and_then(|bytes| bytes.first())
                .is_some_and(|byte| *byte == NAK);
            match (is_nak, summary) {
                (true, Some(summary)) => {
                    Classification::fail(format!("negative acknowledgement: {summary}"))
                }
                (false, Some(summary)) => Classification::success(format!("reply: {summary}")),
                (_, None) => Classification::success("command sent"),
            }
        }
    }
}

/// 编码错误的分类（分派期兜底）。
pub fn classify_encoding_error(err: &EncodingError) -> Classification {
    Classification::fail(format!("encoding error: {err}"))
}
