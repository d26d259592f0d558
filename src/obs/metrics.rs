// self
use crate::{_prelude::*, obs::RequestOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(method: &Method, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"kupula_client_request_total",
			"method" => method.as_str().to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}
