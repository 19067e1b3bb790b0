use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub api_requests_total: IntCounterVec,
    pub api_request_latency_seconds: HistogramVec,
    pub realtime_frames_total: IntCounterVec,
    pub session_authenticated: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let api_requests_total = IntCounterVec::new(
            Opts::new("api_requests_total", "Total API requests by method and outcome"),
            &["method", "outcome"],
        )
        .expect("valid api_requests_total metric");

        let api_request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "api_request_latency_seconds",
                "Latency of API requests in seconds",
            ),
            &["method"],
        )
        .expect("valid api_request_latency_seconds metric");

        let realtime_frames_total = IntCounterVec::new(
            Opts::new("realtime_frames_total", "Realtime frames received by kind"),
            &["kind"],
        )
        .expect("valid realtime_frames_total metric");

        let session_authenticated = IntGauge::new(
            "session_authenticated",
            "1 while the session store holds an authenticated session",
        )
        .expect("valid session_authenticated metric");

        registry
            .register(Box::new(api_requests_total.clone()))
            .expect("register api_requests_total");
        registry
            .register(Box::new(api_request_latency_seconds.clone()))
            .expect("register api_request_latency_seconds");
        registry
            .register(Box::new(realtime_frames_total.clone()))
            .expect("register realtime_frames_total");
        registry
            .register(Box::new(session_authenticated.clone()))
            .expect("register session_authenticated");

        Self {
            registry,
            api_requests_total,
            api_request_latency_seconds,
            realtime_frames_total,
            session_authenticated,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
