//! Consumer-side logic of the dashboard pages: fetching from the API,
//! deriving prop rows and refreshing live views on a timer.

pub mod client;
pub mod poller;
pub mod props;

pub use client::{ClientError, DashboardClient, PredictionsOutcome};
pub use poller::Poller;
pub use props::{
    extract_props, filter_and_sort, synthesize_line, PlayerProp, PropFilter, PropType, SortKey,
};
