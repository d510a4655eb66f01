// Incremental text/event-stream framing
//
// Bytes arrive in arbitrary chunks; events are dispatched on a blank line.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct EventStreamParser {
    pending: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if event.is_none() && data.is_empty() {
            return None;
        }
        Some(ServerEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data: data.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b"event: put\ndata: {\"path\":\"/\",\"data\":1}\n\n");

        assert_eq!(
            events,
            vec![ServerEvent {
                event: "put".to_string(),
                data: "{\"path\":\"/\",\"data\":1}".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed(b"event: pa").is_empty());
        assert!(parser.feed(b"tch\r\ndata: {}\r\n").is_empty());
        let events = parser.feed(b"\r\nevent: keep-alive\ndata: null\n\n");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "patch");
        assert_eq!(events[0].data, "{}");
        assert_eq!(events[1].event, "keep-alive");
    }

    #[test]
    fn test_comments_and_multiline_data() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b": heartbeat\n\ndata: a\ndata: b\nid: 7\n\n");

        assert_eq!(
            events,
            vec![ServerEvent {
                event: "message".to_string(),
                data: "a\nb".to_string(),
            }]
        );
    }
}
