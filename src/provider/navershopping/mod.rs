//! The reference Task Provider: a price-watch pipeline over the
//! Naver Shopping product-search API. Fetches paginated results, filters by
//! keyword and price, diffs against the previous snapshot, and renders a
//! human-facing report.

mod api;
mod compare;
mod model;
mod render;
mod settings;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{NotifyError, NotifyResult};
use crate::ids::{CommandId, RunBy, TaskId};

use super::{ProviderCommandConfig, ProviderOutcome, TaskBase, TaskProvider};
use crate::fetcher::Fetcher;

pub use model::{DiffKind, NaverItem, NaverSearchResponse, Product, ProductDiff, ProductSnapshot};
pub use settings::{CommandSettings, Filters, TaskSettings};

/// The `watch_price` command this task exposes. A provider may expose more
/// than one command in the general case; the reference provider exposes
/// exactly one.
pub const WATCH_PRICE_COMMAND: &str = "watch_price";

pub struct NaverShoppingProvider {
    task_id: TaskId,
    commands: Vec<ProviderCommandConfig>,
    fetcher: Arc<dyn Fetcher>,
}

impl NaverShoppingProvider {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            task_id: TaskId::new("navershopping"),
            commands: vec![ProviderCommandConfig::new(
                CommandId::new(WATCH_PRICE_COMMAND),
                false,
                ProductSnapshot::empty,
            )],
            fetcher,
        }
    }
}

#[async_trait]
impl TaskProvider for NaverShoppingProvider {
    fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    fn command_configs(&self) -> &[ProviderCommandConfig] {
        &self.commands
    }

    fn validate_settings(
        &self,
        task_data: &serde_json::Value,
        command_data: &serde_json::Value,
    ) -> NotifyResult<()> {
        TaskSettings::decode_and_validate(task_data)?;
        CommandSettings::decode_and_validate(command_data)?;
        Ok(())
    }

    async fn run(
        &self,
        base: &TaskBase,
        task_data: &serde_json::Value,
        command_data: &serde_json::Value,
        prev_snapshot: Option<serde_json::Value>,
        supports_html: bool,
    ) -> NotifyResult<ProviderOutcome> {
        let task_settings = TaskSettings::decode_and_validate(task_data)?;
        let command_settings = CommandSettings::decode_and_validate(command_data)?;

        let prev_snapshot: Option<ProductSnapshot> = match prev_snapshot {
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|e| NotifyError::Internal(format!("corrupt snapshot: {e}")))?,
            ),
            None => None,
        };
        let prev_products: Option<&[model::Product]> =
            prev_snapshot.as_ref().map(|s| s.products.as_slice());

        let raw_items = api::fetch_all(
            self.fetcher.as_ref(),
            &task_settings.client_id,
            &task_settings.client_secret,
            &command_settings,
            &base.cancel,
        )
        .await?;

        base.check_cancel()?;

        let mut current = api::parse_and_filter(raw_items, &command_settings);
        let (diffs, has_changes) = compare::compare(&mut current, prev_products);

        let message = analyse_and_report(&command_settings, &diffs, &current, base.run_by, supports_html);

        let snapshot = if has_changes {
            Some(
                serde_json::to_value(ProductSnapshot::new(current))
                    .expect("ProductSnapshot is always serializable"),
            )
        } else {
            None
        };

        Ok(ProviderOutcome {
            message,
            should_save: has_changes,
            snapshot,
        })
    }
}

/// Turn a diff set (plus, for the no-diff cases, the current list) into the
/// notification body.
fn analyse_and_report(
    settings: &CommandSettings,
    diffs: &[model::ProductDiff],
    current: &[model::Product],
    run_by: RunBy,
    supports_html: bool,
) -> String {
    if !diffs.is_empty() {
        return format!(
            "상품 정보가 변경되었습니다\n\n{}\n\n{}",
            render::render_conditions(settings),
            render::render_diffs(diffs, supports_html)
        );
    }

    if run_by != RunBy::User {
        return String::new();
    }

    if current.is_empty() {
        format!(
            "조건에 맞는 상품이 없습니다\n\n{}",
            render::render_conditions(settings)
        )
    } else {
        format!(
            "변경된 정보가 없습니다\n\n{}\n\n{}",
            render::render_conditions(settings),
            render::render_current_list(current, supports_html)
        )
    }
}
