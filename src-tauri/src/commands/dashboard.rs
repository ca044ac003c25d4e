use crate::analysis::aggregate::aggregate;
use crate::analysis::display::{hours_since_update, last_updated_label, palette};
use crate::analysis::period::{filter_by_range, month_range};
use crate::analysis::ranking::rank_counts;
use crate::analysis::rollup::{category_series, rollup_category_day, rollup_day, technology_series};
use crate::commands::fetch::{fetch_snapshot, FetchOptions, SnapshotSource};
use crate::error::{PulseError, PulseResult};
use crate::models::dashboard::{DashboardState, DashboardSummary, DashboardView, PeriodSelection};
use crate::models::history::HistoryModel;
use crate::models::selection::{CategoryCountMap, DonutData, SelectionState, TimelineData, TimelineDataset};
use crate::models::snapshot::RawSnapshot;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "desktop")]
use crate::commands::settings::{load_effective_settings, EffectiveSettings, SettingsDir};

pub type SharedDashboard = Arc<Mutex<DashboardState>>;

const MIN_TOP_N: usize = 3;
const MAX_TOP_N: usize = 30;

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn load_history(
    source: Option<SnapshotSource>,
    settings_dir: tauri::State<'_, SettingsDir>,
    state: tauri::State<'_, SharedDashboard>,
) -> Result<DashboardSummary, String> {
    let settings = effective_settings(&settings_dir)?;
    let source = source.unwrap_or(settings.source);
    load_history_internal(&source, &settings.fetch, state.inner())
        .await
        .map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_donut_data(
    category: Option<String>,
    day_index: Option<usize>,
    top_n: Option<usize>,
    settings_dir: tauri::State<'_, SettingsDir>,
    state: tauri::State<'_, SharedDashboard>,
) -> Result<DonutData, String> {
    let top_n = match top_n {
        Some(n) => n,
        None => {
            let settings = effective_settings(&settings_dir)?;
            if category.is_some() {
                settings.category_top_n
            } else {
                settings.overview_top_n
            }
        }
    };
    get_donut_data_internal(state.inner(), category.as_deref(), day_index, top_n).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_timeline_data(
    category: Option<String>,
    state: tauri::State<'_, SharedDashboard>,
) -> Result<TimelineData, String> {
    get_timeline_data_internal(state.inner(), category.as_deref()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn select_month(
    month: String,
    year: i32,
    state: tauri::State<'_, SharedDashboard>,
) -> Result<PeriodSelection, String> {
    select_month_internal(state.inner(), &month, year).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn clear_month(state: tauri::State<'_, SharedDashboard>) -> Result<DashboardSummary, String> {
    clear_month_internal(state.inner(), Utc::now()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_dashboard_summary(state: tauri::State<'_, SharedDashboard>) -> Result<DashboardSummary, String> {
    get_dashboard_summary_internal(state.inner(), Utc::now()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
fn effective_settings(dir: &SettingsDir) -> Result<EffectiveSettings, String> {
    load_effective_settings(&dir.0).map_err(|e| e.to_string())
}

/// Fetch, parse and aggregate a snapshot, replacing whatever was loaded.
///
/// On failure the previous snapshot and model are dropped as well, so no
/// view keeps rendering aggregates of an unrelated document.
pub async fn load_history_internal(
    source: &SnapshotSource,
    options: &FetchOptions,
    state: &SharedDashboard,
) -> PulseResult<DashboardSummary> {
    // The lock is only taken after the fetch completes.
    let fetched = fetch_snapshot(source, options).await;

    let mut guard = lock_state(state)?;
    match fetched {
        Ok(raw) => {
            install_snapshot(&mut guard, raw);
            if let Some(model) = guard.history.as_ref() {
                log::info!(
                    "Loaded history: {} dates, {} categories, {} technologies",
                    model.dates.len(),
                    model.categories.len(),
                    model.technologies.len()
                );
            }
            summarize(&guard, Utc::now())
        }
        Err(err) => {
            log::error!("Failed to load history: {err}");
            guard.clear();
            Err(err)
        }
    }
}

/// Top-N donut for the overview (`category == None`) or one category.
///
/// Also records which view is being shown. A selection with nothing to draw
/// comes back with [`SelectionState::Empty`] rather than as an error.
pub fn get_donut_data_internal(
    state: &SharedDashboard,
    category: Option<&str>,
    day_index: Option<usize>,
    top_n: usize,
) -> PulseResult<DonutData> {
    let mut guard = lock_state(state)?;
    let model = guard.history.as_ref().ok_or(PulseError::NoData)?;

    let day = day_index.or_else(|| model.latest_index());
    let date = day.and_then(|d| model.dates.get(d).cloned());
    let counts = donut_counts(model, category, day)?;

    let ranked = rank_counts(&counts, top_n.clamp(MIN_TOP_N, MAX_TOP_N));
    let colors = palette(ranked.len());
    let selection_state = if ranked.is_empty() {
        SelectionState::Empty
    } else {
        SelectionState::Ready
    };

    guard.view = match category {
        Some(name) => DashboardView::Category(name.to_string()),
        None => DashboardView::Overview,
    };

    Ok(DonutData {
        category: category.map(str::to_string),
        date,
        labels: ranked.labels,
        values: ranked.values,
        colors,
        state: selection_state,
    })
}

fn donut_counts(model: &HistoryModel, category: Option<&str>, day: Option<usize>) -> PulseResult<CategoryCountMap> {
    match (category, day) {
        (None, Some(day)) => Ok(rollup_day(model, day)),
        (None, None) => Ok(CategoryCountMap::new()),
        (Some(name), Some(day)) => {
            rollup_category_day(model, name, day).ok_or_else(|| PulseError::category_not_found(name))
        }
        (Some(name), None) => model
            .category(name)
            .map(|_| CategoryCountMap::new())
            .ok_or_else(|| PulseError::category_not_found(name)),
    }
}

/// Line-chart series over every date of the current model.
pub fn get_timeline_data_internal(state: &SharedDashboard, category: Option<&str>) -> PulseResult<TimelineData> {
    let guard = lock_state(state)?;
    let model = guard.history.as_ref().ok_or(PulseError::NoData)?;

    let series = match category {
        None => category_series(model),
        Some(name) => technology_series(model, name).ok_or_else(|| PulseError::category_not_found(name))?,
    };

    let colors = palette(series.len());
    let datasets = series
        .into_iter()
        .zip(colors)
        .map(|((label, data), color)| TimelineDataset { label, data, color })
        .collect();

    Ok(TimelineData {
        category: category.map(str::to_string),
        labels: model.dates.clone(),
        datasets,
    })
}

/// Narrow the displayed model to one calendar month of the loaded snapshot.
///
/// An invalid month or a month without data leaves the current model as it
/// was; the latter is reported as [`PeriodSelection::Empty`].
pub fn select_month_internal(state: &SharedDashboard, month: &str, year: i32) -> PulseResult<PeriodSelection> {
    let mut guard = lock_state(state)?;
    let full = guard.full_snapshot.as_ref().ok_or(PulseError::NoData)?;

    let range = month_range(month, year).map_err(|err| {
        log::warn!("Ignoring month selection {month} {year}: {err}");
        err
    })?;
    let period = range.to_selection();

    let filtered = filter_by_range(full, &range);
    if !filtered.has_dates() {
        log::warn!("No history between {} and {}", period.first_day, period.last_day);
        return Ok(PeriodSelection::Empty { period });
    }

    let date_count = filtered.date_count();
    guard.history = Some(aggregate(&filtered));
    guard.period = Some(period.clone());

    Ok(PeriodSelection::Applied { period, date_count })
}

/// Drop the month filter and show the full snapshot again.
pub fn clear_month_internal(state: &SharedDashboard, now: DateTime<Utc>) -> PulseResult<DashboardSummary> {
    let mut guard = lock_state(state)?;
    let full = guard.full_snapshot.as_ref().ok_or(PulseError::NoData)?;

    let model = aggregate(full);
    guard.history = Some(model);
    guard.period = None;

    summarize(&guard, now)
}

pub fn get_dashboard_summary_internal(state: &SharedDashboard, now: DateTime<Utc>) -> PulseResult<DashboardSummary> {
    let guard = lock_state(state)?;
    summarize(&guard, now)
}

fn install_snapshot(state: &mut DashboardState, raw: RawSnapshot) {
    let model = aggregate(&raw);
    if let DashboardView::Category(name) = &state.view {
        if model.category(name).is_none() {
            state.view = DashboardView::Overview;
        }
    }

    state.history = Some(model);
    state.full_snapshot = Some(raw);
    state.period = None;
}

fn summarize(state: &DashboardState, now: DateTime<Utc>) -> PulseResult<DashboardSummary> {
    let model = state.history.as_ref().ok_or(PulseError::NoData)?;

    Ok(DashboardSummary {
        first_date: model.dates.first().cloned(),
        latest_date: model.latest_date().map(str::to_string),
        date_count: model.dates.len(),
        category_count: model.categories.len(),
        technology_count: model.technologies.len(),
        period: state.period.clone(),
        view: state.view.clone(),
        hours_since_update: hours_since_update(now),
        updated_label: last_updated_label(now),
    })
}

fn lock_state(state: &SharedDashboard) -> PulseResult<MutexGuard<'_, DashboardState>> {
    state.lock().map_err(|_| PulseError::StateLock)
}
