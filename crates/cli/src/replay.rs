//! JSON-lines packet replay.

use std::io::BufRead;

use interceptor::{InterceptorChain, Packet, Session};
use serde::Deserialize;
use tracing::{debug_span, warn};

/// One input line.
#[derive(Debug, Deserialize)]
pub struct ReplayRecord {
    pub packet: Packet,
    #[serde(default)]
    pub session: Session,
    #[serde(default = "default_true")]
    pub incoming: bool,
    #[serde(default = "default_true")]
    pub processed: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub replayed: usize,
    pub skipped: usize,
    pub rejected: usize,
}

/// Feeds every parsable line to the chain. Malformed lines are logged and
/// skipped; only read failures abort the replay.
pub fn replay(input: impl BufRead, chain: &InterceptorChain) -> std::io::Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(error) => {
                warn!(line = line_no, %error, "Skipping malformed packet");
                stats.skipped += 1;
                continue;
            }
        };

        let _span = debug_span!("packet", line = line_no).entered();
        let decision = chain.invoke(&record.packet, &record.session, record.incoming, record.processed);
        if !decision.is_allow() {
            stats.rejected += 1;
        }
        stats.replayed += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use interceptor::{InterceptDecision, InterceptorRegistry, PacketInterceptor};

    #[derive(Default)]
    struct Recording(Mutex<Vec<(bool, bool)>>);

    impl PacketInterceptor for Recording {
        fn intercept_packet(
            &self,
            _packet: &Packet,
            _session: &Session,
            incoming: bool,
            processed: bool,
        ) -> InterceptDecision {
            self.0.lock().unwrap().push((incoming, processed));
            InterceptDecision::Allow
        }
    }

    #[test]
    fn replays_valid_lines_and_skips_the_rest() {
        let chain = InterceptorChain::new();
        let recorder = Arc::new(Recording::default());
        chain.add_interceptor(recorder.clone());

        let input = concat!(
            r#"{"packet":{"kind":"message","from":"a@x/1","to":"b@x","type":"chat","body":"hi"}}"#,
            "\n",
            "\n",
            "not json\n",
            r#"{"packet":{"kind":"presence"},"incoming":false,"processed":true}"#,
            "\n",
        );

        let stats = replay(input.as_bytes(), &chain).unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                replayed: 2,
                skipped: 1,
                rejected: 0
            }
        );
        assert_eq!(*recorder.0.lock().unwrap(), vec![(true, true), (false, true)]);
    }

    #[test]
    fn invalid_address_makes_line_malformed() {
        let chain = InterceptorChain::new();
        let input = r#"{"packet":{"kind":"message","from":"@x","to":"b@x"}}"#;

        let stats = replay(input.as_bytes(), &chain).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.replayed, 0);
    }
}
