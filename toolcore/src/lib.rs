pub mod scene;
pub mod settings;

use anyhow::{anyhow, Result};

type MetricsObserver = <metrics_runtime::observers::YamlBuilder as metrics_core::Builder>::Output;

/// Global metrics recorder whose contents can be dumped as YAML.
pub struct MetricsLog {
    controller: metrics_runtime::Controller,
    observer: MetricsObserver,
}

impl MetricsLog {
    /// Installs the process-wide recorder. Call at most once.
    pub fn install() -> Result<Self> {
        use metrics_core::Builder;

        let receiver = metrics_runtime::Receiver::builder()
            .build()
            .map_err(|err| anyhow!("Building metrics receiver: {:?}", err))?;
        let controller = receiver.controller();
        receiver.install();

        Ok(Self {
            controller,
            observer: metrics_runtime::observers::YamlBuilder::new().build(),
        })
    }

    pub fn drain(&mut self) -> String {
        use metrics_core::{Drain, Observe};
        self.controller.observe(&mut self.observer);
        self.observer.drain()
    }
}
