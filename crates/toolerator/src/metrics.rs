use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

use crate::Toolerator;

#[derive(Clone)]
pub struct ToolchangerMetrics {
    pub write_frames: IntCounter,
    pub read_frames: IntCounter,
    pub error_latches: IntCounter,
    pub instances: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub tc: ToolchangerMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let write_frames =
            IntCounter::new("toolerator_write_frames", "Total write frames serialised")
                .map_err(|e| format!("metrics init error: {e}"))?;
        let read_frames =
            IntCounter::new("toolerator_read_frames", "Total read frames processed")
                .map_err(|e| format!("metrics init error: {e}"))?;
        let error_latches = IntCounter::new(
            "toolerator_error_latches",
            "Times an instance latched the error signal",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let instances = IntGauge::new("toolerator_instances", "Configured toolerator instances")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let tc = ToolchangerMetrics {
            write_frames,
            read_frames,
            error_latches,
            instances,
        };
        let _ = registry.register(Box::new(tc.write_frames.clone()));
        let _ = registry.register(Box::new(tc.read_frames.clone()));
        let _ = registry.register(Box::new(tc.error_latches.clone()));
        let _ = registry.register(Box::new(tc.instances.clone()));
        Ok(Self { registry, tc })
    }

    pub fn observe_board(&self, board: &Toolerator) {
        self.tc.instances.set(board.len() as i64);
    }

    /// Record one completed cycle. `errors_before` is the number of instances
    /// that had the error signal set before the read block was processed.
    pub fn observe_cycle(&self, board: &Toolerator, errors_before: usize) {
        let n = board.len() as u64;
        self.tc.write_frames.inc_by(n);
        self.tc.read_frames.inc_by(n);
        let errors_after = board.instances().iter().filter(|i| i.outputs.error).count();
        if errors_after > errors_before {
            self.tc
                .error_latches
                .inc_by((errors_after - errors_before) as u64);
        }
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_counters() {
        let raw = [2u8, 6, 6, 0];
        let mut cursor: &[u8] = &raw;
        let mut board = Toolerator::from_config(&mut cursor).unwrap();
        let hub = MetricsHub::new().unwrap();
        hub.observe_board(&board);

        board.instance_mut(1).unwrap().outputs.error = true;
        hub.observe_cycle(&board, 0);
        hub.observe_cycle(&board, 1);

        assert_eq!(hub.tc.instances.get(), 2);
        assert_eq!(hub.tc.write_frames.get(), 4);
        assert_eq!(hub.tc.read_frames.get(), 4);
        assert_eq!(hub.tc.error_latches.get(), 1);
        assert!(hub.encode_text().contains("toolerator_error_latches 1"));
    }
}
