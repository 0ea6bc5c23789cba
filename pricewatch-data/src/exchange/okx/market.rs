use crate::instrument::Symbol;
use serde::{Deserialize, Serialize};

/// [`Okx`](super::Okx) spot instrument.
///
/// See docs: <https://www.okx.com/docs-v5/en/#public-data-rest-api-get-instruments>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxInstrument {
    pub inst_id: String,
    pub base_ccy: String,
    pub quote_ccy: String,
    pub state: String,
}

impl OkxInstrument {
    /// [`Symbol`] for an instrument in `live` state.
    pub fn live_symbol(&self) -> Option<Symbol> {
        (self.state == "live").then(|| Symbol::new(&self.base_ccy, &self.quote_ccy))
    }
}
