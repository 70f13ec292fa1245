//! Wire-format tests for the multipart encoder.
//!
//! The round-trip law is checked with a small conformant parser written
//! here in the test crate: it knows nothing about how the encoder lays
//! out bytes, only what RFC 2046 says a `multipart/form-data` body looks
//! like. If the parser can recover exactly the parts that went in — names,
//! filenames, content types, payload bytes, order — the encoder's output
//! is well-formed.

use nanonets_ocr::multipart::{encode, encode_with_boundary, Part};

// ── A minimal conformant multipart parser ────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct ParsedPart {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    payload: Vec<u8>,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Extract `key="value"` from a Content-Disposition header line.
fn disposition_param(header: &str, key: &str) -> Option<String> {
    let marker = format!("{key}=\"");
    let start = header.find(&marker)? + marker.len();
    let end = header[start..].find('"')? + start;
    Some(header[start..end].to_string())
}

/// Parse a `multipart/form-data` body against its Content-Type header.
///
/// Panics (failing the test) on any structural violation: missing CRLFs,
/// unterminated parts, or a body that does not end with the close
/// delimiter.
fn parse_multipart(content_type: &str, body: &[u8]) -> Vec<ParsedPart> {
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("content type must declare a form-data boundary");

    let delimiter = format!("--{boundary}\r\n").into_bytes();
    let close = format!("--{boundary}--\r\n").into_bytes();
    let inner_delimiter = format!("\r\n--{boundary}").into_bytes();

    assert!(
        body.ends_with(&close),
        "body must end with the close delimiter"
    );
    if body.len() == close.len() {
        return Vec::new(); // no parts
    }

    assert!(
        body.starts_with(&delimiter),
        "body must open with the first delimiter"
    );

    let mut parts = Vec::new();
    let mut pos = delimiter.len();

    loop {
        // Headers run to the blank line.
        let headers_end = find(body, b"\r\n\r\n", pos).expect("part must have a header block");
        let headers = std::str::from_utf8(&body[pos..headers_end])
            .expect("part headers must be valid UTF-8");

        let mut name = None;
        let mut filename = None;
        let mut content_type_hdr = None;
        for line in headers.split("\r\n") {
            if let Some(rest) = line.strip_prefix("Content-Disposition: form-data; ") {
                name = disposition_param(rest, "name");
                filename = disposition_param(rest, "filename");
            } else if let Some(ct) = line.strip_prefix("Content-Type: ") {
                content_type_hdr = Some(ct.to_string());
            }
        }

        // Payload runs to the next `\r\n--boundary`.
        let payload_start = headers_end + 4;
        let payload_end =
            find(body, &inner_delimiter, payload_start).expect("part payload must be terminated");
        parts.push(ParsedPart {
            name: name.expect("part must carry a field name"),
            filename,
            content_type: content_type_hdr,
            payload: body[payload_start..payload_end].to_vec(),
        });

        // After the delimiter: either another part or the close marker.
        pos = payload_end + inner_delimiter.len();
        if body[pos..].starts_with(b"--\r\n") {
            assert_eq!(pos + 4, body.len(), "nothing may follow the close delimiter");
            return parts;
        }
        assert!(
            body[pos..].starts_with(b"\r\n"),
            "delimiter must be followed by CRLF or the close marker"
        );
        pos += 2;
    }
}

// ── Round-trip law ───────────────────────────────────────────────────────

#[test]
fn text_fields_round_trip_in_order() {
    let parts = vec![
        Part::text("output_format", "markdown"),
        Part::text("custom_instructions", "ignore page numbers"),
        Part::text("include_metadata", "bounding_boxes,confidence_score"),
    ];
    let form = encode(&parts);
    let parsed = parse_multipart(&form.content_type, &form.body);

    let pairs: Vec<(&str, &[u8])> = parsed
        .iter()
        .map(|p| (p.name.as_str(), p.payload.as_slice()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("output_format", b"markdown".as_slice()),
            ("custom_instructions", b"ignore page numbers".as_slice()),
            (
                "include_metadata",
                b"bounding_boxes,confidence_score".as_slice()
            ),
        ]
    );
    for p in &parsed {
        assert!(p.filename.is_none());
        assert!(p.content_type.is_none());
    }
}

#[test]
fn file_fields_round_trip_byte_exact() {
    // Payload includes CRLFs, NULs, and high bytes to make sure nothing
    // in the encoder treats payload bytes as text.
    let payload = vec![0x00, 0x0d, 0x0a, 0xff, 0x2d, 0x2d, 0x7f];
    let form = encode(&[Part::file(
        "file",
        payload.clone(),
        "scan 1.tiff",
        "image/tiff",
    )]);
    let parsed = parse_multipart(&form.content_type, &form.body);

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].name, "file");
    assert_eq!(parsed[0].filename.as_deref(), Some("scan 1.tiff"));
    assert_eq!(parsed[0].content_type.as_deref(), Some("image/tiff"));
    assert_eq!(parsed[0].payload, payload);
}

#[test]
fn zero_length_file_round_trips() {
    let form = encode(&[Part::file("file", vec![], "empty.pdf", "application/pdf")]);
    let parsed = parse_multipart(&form.content_type, &form.body);

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].filename.as_deref(), Some("empty.pdf"));
    assert_eq!(parsed[0].payload, Vec::<u8>::new());
}

#[test]
fn mixed_parts_keep_input_order_and_repeats() {
    // Batch uploads rely on repeated `files` parts staying separate and
    // positional.
    let parts = vec![
        Part::text("output_format", "json"),
        Part::file("files", vec![1], "one.pdf", "application/pdf"),
        Part::file("files", vec![2], "two.pdf", "application/pdf"),
        Part::file("files", vec![3], "three.pdf", "application/pdf"),
    ];
    let form = encode(&parts);
    let parsed = parse_multipart(&form.content_type, &form.body);

    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed[0].name, "output_format");
    for (i, p) in parsed[1..].iter().enumerate() {
        assert_eq!(p.name, "files", "repeated names must not be merged");
        assert_eq!(p.payload, vec![i as u8 + 1], "order must match input");
    }
}

// ── Boundary placement ───────────────────────────────────────────────────

#[test]
fn boundary_appears_only_at_delimiter_positions() {
    let parts = vec![
        Part::text("a", "alpha"),
        Part::file("file", b"binary payload".to_vec(), "a.png", "image/png"),
    ];
    let form = encode(&parts);
    let boundary = form
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();

    // One occurrence per part delimiter plus one for the close.
    let needle = boundary.as_bytes();
    let mut count = 0;
    let mut from = 0;
    while let Some(at) = find(&form.body, needle, from) {
        count += 1;
        // Every occurrence is part of a `--boundary` delimiter.
        assert!(at >= 2 && &form.body[at - 2..at] == b"--");
        from = at + needle.len();
    }
    assert_eq!(count, parts.len() + 1);
}

// ── Concrete scenarios ───────────────────────────────────────────────────

#[test]
fn empty_part_list_is_only_the_close_delimiter() {
    let form = encode(&[]);
    let boundary = form
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    assert_eq!(form.body, format!("--{boundary}--\r\n").into_bytes());
    assert!(parse_multipart(&form.content_type, &form.body).is_empty());
}

#[test]
fn text_plus_pdf_scenario_has_exact_length() {
    let form = encode(&[
        Part::text("output_format", "markdown"),
        Part::file("file", vec![0x01, 0x02, 0x03], "a.pdf", "application/pdf"),
    ]);
    let boundary = form
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap()
        .to_string();
    assert!(boundary.starts_with("----NanonetsFormBoundary"));

    let parsed = parse_multipart(&form.content_type, &form.body);
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "output_format");
    assert_eq!(parsed[1].name, "file");

    // Total length is the sum of every literal delimiter/header byte plus
    // the 3 payload bytes plus the close delimiter. No padding, ever.
    let expected = format!("--{boundary}\r\n").len()
        + "Content-Disposition: form-data; name=\"output_format\"\r\n\r\n".len()
        + "markdown".len()
        + "\r\n".len()
        + format!("--{boundary}\r\n").len()
        + "Content-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n".len()
        + "Content-Type: application/pdf\r\n\r\n".len()
        + 3
        + "\r\n".len()
        + format!("--{boundary}--\r\n").len();
    assert_eq!(form.body.len(), expected);
}

#[test]
fn consecutive_calls_differ_only_in_boundary() {
    let parts = vec![
        Part::text("output_format", "markdown"),
        Part::text("custom_instructions", "summarise"),
    ];
    let first = encode(&parts);
    let second = encode(&parts);

    let b1 = first
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap()
        .to_string();
    let b2 = second
        .content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap()
        .to_string();
    assert_ne!(b1, b2, "each call must generate a fresh boundary");

    // Structurally identical: substituting a fixed token for each body's
    // own boundary yields the same bytes.
    let n1 = String::from_utf8(first.body).unwrap().replace(&b1, "B");
    let n2 = String::from_utf8(second.body).unwrap().replace(&b2, "B");
    assert_eq!(n1, n2);
}

// ── Deterministic layout (fixed boundary) ────────────────────────────────

#[test]
fn fixed_boundary_output_is_reproducible() {
    let parts = vec![
        Part::text("categories", r#"[{"name":"invoice"}]"#),
        Part::file("file", vec![7], "x.jpg", "image/jpeg"),
    ];
    let a = encode_with_boundary(&parts, "fixed-token");
    let b = encode_with_boundary(&parts, "fixed-token");
    assert_eq!(a.body, b.body);
    assert_eq!(a.content_type, "multipart/form-data; boundary=fixed-token");
}
