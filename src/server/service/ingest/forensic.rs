//! Forensic (RUF) failure reports in the Abuse Reporting Format (RFC 5965).
//!
//! Only the parts needed for DMARC failure reports are understood: the
//! `message/feedback-report` part and the returned headers of the original
//! message.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::server::{error::ingest::IngestError, model::report::ParsedForensicReport};

/// Stored copies of original headers are cut to this many bytes.
const MAX_RAW_HEADERS: usize = 64 * 1024;

/// A header block followed by a body.
struct Part<'a> {
    headers: Vec<(String, String)>,
    body: &'a str,
}

impl<'a> Part<'a> {
    fn parse(text: &'a str) -> Self {
        let (head, body) = split_head(text);
        Self {
            headers: parse_headers(head),
            body,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn content_type(&self) -> String {
        self.header("Content-Type")
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Body with any base64 or quoted-printable transfer encoding removed.
    fn decoded_body(&self) -> String {
        let encoding = self
            .header("Content-Transfer-Encoding")
            .map(|e| e.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match encoding.as_str() {
            "base64" => {
                let compact: String = self.body.split_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .ok()
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .unwrap_or_else(|| self.body.to_string())
            }
            "quoted-printable" => decode_quoted_printable(self.body),
            _ => self.body.to_string(),
        }
    }
}

/// Parses an ARF message, or a bare feedback-report body.
///
/// # Returns
/// - `Ok(ParsedForensicReport)` - Report with at least feedback type and
///   reported domain
/// - `Err(IngestError::InvalidForensic)` - Not UTF-8, no feedback-report part,
///   or required fields missing
pub fn parse_forensic(bytes: &[u8]) -> Result<ParsedForensicReport, IngestError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestError::InvalidForensic(e.to_string()))?
        .replace("\r\n", "\n");

    let message = Part::parse(&text);
    let parts = match boundary(&message) {
        Some(boundary) => split_multipart(message.body, &boundary),
        None => Vec::new(),
    };

    let feedback_body = match parts
        .iter()
        .find(|p| p.content_type() == "message/feedback-report")
    {
        Some(part) => part.decoded_body(),
        None if parts.is_empty() => text.clone(),
        None => {
            return Err(IngestError::InvalidForensic(
                "message has no message/feedback-report part".to_string(),
            ))
        }
    };

    let fields = parse_headers(&feedback_body);
    let field = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    };

    let Some(feedback_type) = field("Feedback-Type") else {
        return Err(IngestError::InvalidForensic(
            "Feedback-Type is missing".to_string(),
        ));
    };
    let Some(reported_domain) = field("Reported-Domain") else {
        return Err(IngestError::InvalidForensic(
            "Reported-Domain is missing".to_string(),
        ));
    };

    let original = parts.iter().find(|p| {
        matches!(
            p.content_type().as_str(),
            "text/rfc822-headers" | "message/rfc822"
        )
    });
    let raw_headers = original.map(|p| {
        let decoded = p.decoded_body();
        let (head, _) = split_head(&decoded);
        truncate(head.trim(), MAX_RAW_HEADERS)
    });
    let subject = raw_headers
        .as_deref()
        .map(parse_headers)
        .and_then(|h| {
            h.into_iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("Subject"))
                .map(|(_, v)| v)
        })
        .or_else(|| message.header("Subject").map(str::to_string));

    Ok(ParsedForensicReport {
        feedback_type: feedback_type.to_ascii_lowercase(),
        reported_domain: reported_domain.trim_end_matches('.').to_ascii_lowercase(),
        source_ip: field("Source-IP"),
        arrival_date: field("Arrival-Date").or_else(|| field("Received-Date")),
        original_mail_from: field("Original-Mail-From"),
        original_rcpt_to: field("Original-Rcpt-To"),
        subject,
        auth_failure: field("Auth-Failure"),
        authentication_results: field("Authentication-Results"),
        delivery_result: field("Delivery-Result"),
        dkim_domain: field("DKIM-Domain"),
        raw_headers: raw_headers.filter(|h| !h.is_empty()),
    })
}

/// Splits at the first blank line. Text without one is all header.
fn split_head(text: &str) -> (&str, &str) {
    match text.find("\n\n") {
        Some(idx) => (&text[..idx], &text[idx + 2..]),
        None => (text, ""),
    }
}

/// Parses `Name: value` lines, joining folded continuation lines.
fn parse_headers(head: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in head.lines() {
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}

fn boundary(part: &Part) -> Option<String> {
    let content_type = part.header("Content-Type")?;
    if !content_type.trim().to_ascii_lowercase().starts_with("multipart/") {
        return None;
    }
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn split_multipart<'a>(body: &'a str, boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    body.split(delimiter.as_str())
        .skip(1)
        .take_while(|chunk| !chunk.starts_with("--"))
        .map(|chunk| Part::parse(chunk.strip_prefix('\n').unwrap_or(chunk)))
        .collect()
}

fn decode_quoted_printable(body: &str) -> String {
    let mut out = Vec::with_capacity(body.len());
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'=' if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'=');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARF: &str = "From: dmarc@receiver.example\r
Subject: FW: Report Domain: example.com\r
MIME-Version: 1.0\r
Content-Type: multipart/report; report-type=feedback-report;\r
\tboundary=\"frontier\"\r
\r
--frontier\r
Content-Type: text/plain\r
\r
This is a DMARC failure report.\r
--frontier\r
Content-Type: message/feedback-report\r
\r
Feedback-Type: auth-failure\r
User-Agent: Receiver/1.0\r
Version: 1\r
Original-Mail-From: <bounce@spoof.example>\r
Arrival-Date: Tue, 14 Nov 2023 10:00:00 +0000\r
Source-IP: 203.0.113.9\r
Reported-Domain: Example.com\r
Auth-Failure: dmarc\r
Authentication-Results: mx.receiver.example; dmarc=fail\r
 header.from=example.com\r
Delivery-Result: reject\r
\r
--frontier\r
Content-Type: text/rfc822-headers\r
\r
From: ceo@example.com\r
To: victim@receiver.example\r
Subject: Urgent wire transfer\r
\r
--frontier--\r
";

    /// Expected: feedback fields and original subject extracted
    #[test]
    fn parses_multipart_arf() {
        let report = parse_forensic(ARF.as_bytes()).unwrap();

        assert_eq!(report.feedback_type, "auth-failure");
        assert_eq!(report.reported_domain, "example.com");
        assert_eq!(report.source_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(report.auth_failure.as_deref(), Some("dmarc"));
        assert_eq!(
            report.authentication_results.as_deref(),
            Some("mx.receiver.example; dmarc=fail header.from=example.com")
        );
        assert_eq!(report.delivery_result.as_deref(), Some("reject"));
        assert_eq!(report.subject.as_deref(), Some("Urgent wire transfer"));
        assert!(report
            .raw_headers
            .as_deref()
            .is_some_and(|h| h.contains("From: ceo@example.com")));
    }

    /// Expected: base64-encoded feedback part decoded before parsing
    #[test]
    fn decodes_base64_feedback_part() {
        let feedback = STANDARD.encode("Feedback-Type: auth-failure\nReported-Domain: example.net\n");
        let message = format!(
            "Content-Type: multipart/report; boundary=b1\n\n--b1\nContent-Type: message/feedback-report\nContent-Transfer-Encoding: base64\n\n{}\n--b1--\n",
            feedback
        );

        let report = parse_forensic(message.as_bytes()).unwrap();
        assert_eq!(report.reported_domain, "example.net");
        assert_eq!(report.subject, None);
    }

    #[test]
    fn accepts_bare_feedback_body() {
        let report =
            parse_forensic(b"Feedback-Type: auth-failure\nReported-Domain: example.org\nSource-IP: 192.0.2.1\n")
                .unwrap();
        assert_eq!(report.reported_domain, "example.org");
        assert_eq!(report.source_ip.as_deref(), Some("192.0.2.1"));
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert!(matches!(
            parse_forensic(b"Feedback-Type: auth-failure\n"),
            Err(IngestError::InvalidForensic(_))
        ));
    }

    #[test]
    fn decodes_quoted_printable() {
        assert_eq!(decode_quoted_printable("a=3Db=\nc"), "a=bc");
    }
}
