//! Turning drained log messages into user-facing messages

use super::{Location, Message};
use crate::logging::{Msg, MsgKind, compute_line_and_column, line_text};

/// Position a message within its source, if it has one
fn locate(msg: &Msg) -> Option<Location> {
    let source = msg.source.as_ref()?;
    let (line_count, column, line_start) =
        compute_line_and_column(&source.contents, msg.span.start as usize);

    Some(Location {
        file: source.pretty_path.clone(),
        line: line_count + 1,
        column,
        length: msg.span.size() as usize,
        line_text: line_text(&source.contents, line_start).to_string(),
    })
}

/// Messages of one severity, in the order they were logged
pub fn messages_of_kind(kind: MsgKind, msgs: &[Msg]) -> Vec<Message> {
    msgs.iter()
        .filter(|msg| msg.kind == kind)
        .map(|msg| Message {
            text: msg.text.clone(),
            location: locate(msg),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Source;
    use oxc_span::Span;
    use std::sync::Arc;

    fn source(contents: &str) -> Arc<Source> {
        Arc::new(Source {
            index: 0,
            key_path: "/src/app.ts".to_string(),
            pretty_path: "src/app.ts".to_string(),
            contents: contents.to_string(),
        })
    }

    #[test]
    fn test_position_inside_second_line() {
        let msgs = vec![
            Msg::new(MsgKind::Error, "Unexpected \"h\"")
                .with_source(source("abc\ndefgh\n"), Span::new(8, 9)),
        ];
        let errors = messages_of_kind(MsgKind::Error, &msgs);
        assert_eq!(
            errors,
            vec![Message {
                text: "Unexpected \"h\"".to_string(),
                location: Some(Location {
                    file: "src/app.ts".to_string(),
                    line: 2,
                    column: 4,
                    length: 1,
                    line_text: "defgh".to_string(),
                }),
            }]
        );
    }

    #[test]
    fn test_line_text_stops_at_unicode_terminators() {
        let contents = "one\u{2028}two\u{2029}three\r\nfour";
        let start = contents.find("two").unwrap() as u32;
        let msgs = vec![
            Msg::new(MsgKind::Warning, "w")
                .with_source(source(contents), Span::new(start + 1, start + 3)),
        ];

        let location = messages_of_kind(MsgKind::Warning, &msgs)[0]
            .location
            .clone()
            .unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 1);
        assert_eq!(location.length, 2);
        assert_eq!(location.line_text, "two");

        let start = contents.find("four").unwrap() as u32;
        let msgs = vec![
            Msg::new(MsgKind::Warning, "w").with_source(source(contents), Span::new(start, start)),
        ];
        let location = messages_of_kind(MsgKind::Warning, &msgs)[0]
            .location
            .clone()
            .unwrap();
        assert_eq!(location.line, 4);
        assert_eq!(location.column, 0);
        assert_eq!(location.line_text, "four");
    }

    #[test]
    fn test_columns_are_bytes() {
        let msgs =
            vec![Msg::new(MsgKind::Error, "e").with_source(source("é = 1"), Span::new(3, 4))];
        let location = messages_of_kind(MsgKind::Error, &msgs)[0]
            .location
            .clone()
            .unwrap();
        assert_eq!(location.column, 3);
        assert_eq!(location.line_text, "é = 1");
    }

    #[test]
    fn test_filter_keeps_order_and_sourceless_messages() {
        let msgs = vec![
            Msg::new(MsgKind::Error, "one"),
            Msg::new(MsgKind::Warning, "skipped"),
            Msg::new(MsgKind::Error, "two").with_source(source("x"), Span::new(0, 1)),
            Msg::new(MsgKind::Error, "three"),
        ];
        let errors = messages_of_kind(MsgKind::Error, &msgs);
        let texts: Vec<_> = errors.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(errors[0].location.is_none());
        assert!(errors[1].location.is_some());
        assert!(errors[2].location.is_none());

        let warnings = messages_of_kind(MsgKind::Warning, &msgs);
        assert_eq!(warnings.len(), 1);
    }
}
