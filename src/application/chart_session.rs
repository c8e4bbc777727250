use crate::application::panel_selector::{PanelSelector, SelectorChange};
use crate::application::preferences::{PreferenceStore, UserPreferences};
use crate::domain::chart::{ChartLayoutEngine, ChartSpecification, SkippedPanel};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::Dataset;

/// Rendering collaborator. Consumes a finished specification.
pub trait ChartSurface {
    type Handle;

    fn mount(&self, spec: &ChartSpecification) -> Result<Self::Handle, AppError>;
    fn dispose(&self, handle: Self::Handle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub container_height: u32,
    pub series_count: usize,
    pub skipped_panels: Vec<SkippedPanel>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionUpdate {
    pub changes: Vec<SelectorChange>,
    /// `None` until a dataset has been loaded.
    pub report: Option<RenderReport>,
}

/// Owns the current dataset, the selector state and the live chart. The
/// chart handle is either absent or fully mounted.
pub struct ChartSession<R: ChartSurface, P> {
    surface: R,
    preferences: P,
    engine: ChartLayoutEngine,
    selector: PanelSelector,
    dataset: Option<Dataset>,
    handle: Option<R::Handle>,
}

impl<R: ChartSurface, P: PreferenceStore> ChartSession<R, P> {
    pub fn new(surface: R, preferences: P, engine: ChartLayoutEngine, max_panels: usize) -> Self {
        Self {
            surface,
            preferences,
            engine,
            selector: PanelSelector::new(max_panels),
            dataset: None,
            handle: None,
        }
    }

    /// Restores panel count and selections from the last visit and hands
    /// the saved preferences back to the page.
    pub fn init(&mut self) -> UserPreferences {
        let preferences = match self.preferences.try_load() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                get_logger().warn(
                    LogComponent::Application("ChartSession"),
                    &format!("preferences not loaded: {}", e),
                );
                UserPreferences::default()
            }
        };
        self.selector
            .restore(preferences.panel_count, &preferences.selections);
        preferences
    }

    /// Swaps the dataset wholesale and redraws.
    pub fn replace_dataset(&mut self, dataset: Dataset) -> Result<SessionUpdate, AppError> {
        let changes = self.selector.set_available(dataset.indicators.names());
        self.dataset = Some(dataset);
        self.persist();
        let report = self.render()?;
        Ok(SessionUpdate { changes, report })
    }

    pub fn set_panel_count(&mut self, count: usize) -> Result<SessionUpdate, AppError> {
        let changes = self.selector.set_panel_count(count);
        self.persist();
        let report = self.render()?;
        Ok(SessionUpdate { changes, report })
    }

    pub fn set_selection(&mut self, panel: usize, name: &str) -> Result<SessionUpdate, AppError> {
        let changes = self.selector.set_selection(panel, name);
        self.persist();
        let report = self.render()?;
        Ok(SessionUpdate { changes, report })
    }

    /// Lays out from scratch, disposes the old chart, mounts the new one.
    pub fn render(&mut self) -> Result<Option<RenderReport>, AppError> {
        let Some(dataset) = &self.dataset else {
            return Ok(None);
        };
        let spec = self
            .engine
            .layout(self.selector.panel_count(), dataset, &self.selector.assignment());

        if let Some(previous) = self.handle.take() {
            self.surface.dispose(previous);
        }
        self.handle = Some(self.surface.mount(&spec)?);

        get_logger().debug(
            LogComponent::Application("ChartSession"),
            &format!(
                "rendered {} panels, {} series, {} skipped",
                spec.panel_count(),
                spec.series.len(),
                spec.skipped_panels.len()
            ),
        );
        Ok(Some(RenderReport {
            container_height: spec.container_height,
            series_count: spec.series.len(),
            skipped_panels: spec.skipped_panels,
        }))
    }

    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.surface.dispose(handle);
        }
    }

    pub fn has_chart(&self) -> bool {
        self.handle.is_some()
    }

    pub fn selector(&self) -> &PanelSelector {
        &self.selector
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    fn persist(&self) {
        let panel_count = self.selector.panel_count();
        let selections = self.selector.assignment();
        let saved = self.preferences.try_update(|preferences| {
            preferences.panel_count = panel_count;
            preferences.selections = selections;
        });
        if let Err(e) = saved {
            get_logger().warn(
                LogComponent::Application("ChartSession"),
                &format!("preferences not saved: {}", e),
            );
        }
    }
}

impl<R: ChartSurface, P> Drop for ChartSession<R, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.surface.dispose(handle);
        }
    }
}
