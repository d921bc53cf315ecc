use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging.
/// Log level is controlled through the RUST_LOG environment variable.
///
/// Records emitted through the `log` facade, actix-web's access logger
/// among them, are forwarded into the same subscriber.
pub fn init_telemetry() {
    tracing_log::LogTracer::init().expect("Failed to set log forwarder");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .init();
}

/// Mask an email address before it reaches a log field.
///
/// `johndoe@example.com` becomes `joh***@example.com`; local parts of three
/// characters or fewer are masked entirely.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            if local.len() <= 3 {
                format!("***@{}", domain)
            } else {
                format!("{}***@{}", &local[..3], domain)
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn log_facade_records_reach_the_tracing_subscriber() {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(BufferWriter(buffer.clone()))
            .finish();

        let _ = tracing_log::LogTracer::init();
        tracing::subscriber::with_default(subscriber, || {
            log::warn!("request completed in 3ms");
        });

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.contains("request completed in 3ms"));
    }

    #[test]
    fn masks_long_local_part() {
        assert_eq!(mask_email("johndoe@example.com"), "joh***@example.com");
    }

    #[test]
    fn masks_short_local_part_entirely() {
        assert_eq!(mask_email("jo@example.com"), "***@example.com");
        assert_eq!(mask_email("abc@example.com"), "***@example.com");
    }

    #[test]
    fn tolerates_malformed_addresses() {
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
