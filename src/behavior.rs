//! Viewer integration: theme registration, auto-attach and hover labels.
//!
//! [`QualityReportBehavior`] is the piece a host viewer installs. It owns
//! the shared [`QualityReportProvider`] and one [`QualityThemeProvider`]
//! per reported metric.

use std::sync::Arc;

use crate::model::{is_applicable, StructureModel};
use crate::options::{BehaviorOptions, Metric, Options};
use crate::picking::PickTarget;
use crate::report::{
    QualityReportProvider, ReportError, ReportFetcher, ResidueIndexedStore,
};
use crate::theme::{label_for, QualityColorTheme};

/// Name the hover-label provider is registered under.
pub const LABEL_PROVIDER: &str = "emdb-quality-report";

/// Host-side registry of color themes and hover-label providers.
pub trait ThemeRegistry {
    /// Make a theme selectable under `name`, shown as `label`.
    fn add_theme(&mut self, name: &'static str, label: &'static str);

    /// Remove the theme registered under `name`.
    fn remove_theme(&mut self, name: &str);

    /// Route hover labels through the provider registered under `name`.
    fn add_label_provider(&mut self, name: &'static str);

    /// Stop routing hover labels through `name`.
    fn remove_label_provider(&mut self, name: &str);
}

/// A selectable color theme backed by one metric's report.
pub struct QualityThemeProvider<F> {
    name: &'static str,
    label: &'static str,
    metric: Metric,
    provider: Arc<QualityReportProvider<F>>,
}

impl<F: ReportFetcher> QualityThemeProvider<F> {
    fn new(
        name: &'static str,
        label: &'static str,
        metric: Metric,
        provider: Arc<QualityReportProvider<F>>,
    ) -> Self {
        Self {
            name,
            label,
            metric,
            provider,
        }
    }

    /// Registry name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Metric requested by this theme.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Whether the theme can be offered for `model`.
    pub fn is_applicable<M: StructureModel + ?Sized>(
        &self,
        model: Option<&M>,
    ) -> bool {
        is_applicable(model)
    }

    /// Populate the report for `model` and hold a reference on it until
    /// [`release`](Self::release).
    ///
    /// # Errors
    ///
    /// Propagates the provider's population failure.
    pub fn ensure_attached<M: StructureModel + ?Sized>(
        &self,
        model: &M,
    ) -> Result<Arc<ResidueIndexedStore>, ReportError> {
        let params = self.provider.default_params().with_metric(self.metric);
        self.provider.attach(model, Some(params), true)
    }

    /// Drop the reference taken by [`ensure_attached`](Self::ensure_attached).
    pub fn release<M: StructureModel + ?Sized>(&self, model: &M) {
        self.provider.detach(model);
    }

    /// Theme over whatever store is currently cached for `model`.
    pub fn create<M: StructureModel + ?Sized>(
        &self,
        model: &M,
    ) -> QualityColorTheme {
        let store = self.provider.store(model.id());
        QualityColorTheme::new(self.metric, store, Some(model))
    }
}

/// Quality-report behavior installed into a viewer.
pub struct QualityReportBehavior<F> {
    provider: Arc<QualityReportProvider<F>>,
    options: BehaviorOptions,
    themes: [QualityThemeProvider<F>; 2],
    registered: bool,
}

impl<F: ReportFetcher> QualityReportBehavior<F> {
    /// Behavior over a fresh provider configured from `options`.
    pub fn new(fetcher: F, options: &Options) -> Self {
        let provider = Arc::new(QualityReportProvider::new(
            fetcher,
            options.report.clone(),
            options.behavior.auto_attach,
        ));
        Self::with_provider(provider, options.behavior.clone())
    }

    /// Behavior over an existing provider.
    pub fn with_provider(
        provider: Arc<QualityReportProvider<F>>,
        options: BehaviorOptions,
    ) -> Self {
        let themes = [
            QualityThemeProvider::new(
                "emdb-qscore-report",
                "Q-score Report",
                Metric::Qscore,
                Arc::clone(&provider),
            ),
            QualityThemeProvider::new(
                "emdb-ai-report",
                "Atom inclusion Report",
                Metric::Ai,
                Arc::clone(&provider),
            ),
        ];
        Self {
            provider,
            options,
            themes,
            registered: false,
        }
    }

    /// Shared report provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<QualityReportProvider<F>> {
        &self.provider
    }

    /// Current behavior options.
    #[must_use]
    pub fn options(&self) -> &BehaviorOptions {
        &self.options
    }

    /// Theme providers in registration order.
    #[must_use]
    pub fn themes(&self) -> &[QualityThemeProvider<F>] {
        &self.themes
    }

    /// Theme provider registered under `name`.
    #[must_use]
    pub fn theme(&self, name: &str) -> Option<&QualityThemeProvider<F>> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Add both themes and the label provider to `registry`. Idempotent.
    pub fn register<R: ThemeRegistry + ?Sized>(&mut self, registry: &mut R) {
        if self.registered {
            return;
        }
        for theme in &self.themes {
            registry.add_theme(theme.name, theme.label);
        }
        registry.add_label_provider(LABEL_PROVIDER);
        self.registered = true;
        log::debug!("quality report themes registered");
    }

    /// Remove everything [`register`](Self::register) added. Idempotent.
    pub fn unregister<R: ThemeRegistry + ?Sized>(&mut self, registry: &mut R) {
        if !self.registered {
            return;
        }
        for theme in &self.themes {
            registry.remove_theme(theme.name);
        }
        registry.remove_label_provider(LABEL_PROVIDER);
        self.registered = false;
    }

    /// Hook for a newly loaded model. With auto-attach enabled and an
    /// applicable model, populates the report without taking a reference.
    /// Returns `None` when nothing was attempted.
    pub fn on_model_loaded<M: StructureModel + ?Sized>(
        &self,
        model: &M,
    ) -> Option<Result<Arc<ResidueIndexedStore>, ReportError>> {
        if !self.provider.auto_attach() || !is_applicable(Some(model)) {
            return None;
        }
        Some(self.provider.attach(model, None, false))
    }

    /// Hover label for `target`, looked up in its model's store.
    #[must_use]
    pub fn label(&self, target: &PickTarget) -> Option<String> {
        let store = target.model().and_then(|id| self.provider.store(id));
        label_for(target, store.as_deref(), self.options.show_tooltip)
    }

    /// Apply new options. Returns whether auto-attach changed.
    pub fn update(&mut self, options: BehaviorOptions) -> bool {
        let changed = self
            .provider
            .update(self.provider.default_params(), options.auto_attach);
        self.options = options;
        changed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::fixtures::{two_chain_builder, two_chain_model};
    use crate::model::{ModelId, ResidueIndex};
    use crate::report::parser::NEUTRAL_GRAY;
    use crate::report::{IssueTier, ParsedAs};
    use crate::theme::Granularity;

    const CLASH: &str = r#"{"1abc": {"molecules": [{"entity_id": 1, "chains": [
        {"struct_asym_id": "A", "models": [{"model_id": 1, "residues": [
            {"author_residue_number": 12, "outlier_types": ["clashes"]}
        ]}]}
    ]}]}}"#;

    const BODY: &str = r##"{"emd-1": [
        {"type": "ai", "chain": "A", "position": 11, "score": 0.9, "color": "#7AFCFC"}
    ]}"##;

    #[derive(Default)]
    struct Registry {
        themes: Vec<&'static str>,
        labels: Vec<&'static str>,
    }

    impl ThemeRegistry for Registry {
        fn add_theme(&mut self, name: &'static str, _label: &'static str) {
            self.themes.push(name);
        }

        fn remove_theme(&mut self, name: &str) {
            self.themes.retain(|n| *n != name);
        }

        fn add_label_provider(&mut self, name: &'static str) {
            self.labels.push(name);
        }

        fn remove_label_provider(&mut self, name: &str) {
            self.labels.retain(|n| *n != name);
        }
    }

    type Recorder =
        Box<dyn Fn(&str) -> Result<String, ReportError> + Send + Sync>;

    fn recording(
        urls: Arc<Mutex<Vec<String>>>,
        body: &'static str,
    ) -> Recorder {
        Box::new(move |url: &str| {
            urls.lock().unwrap().push(url.to_owned());
            Ok(body.to_owned())
        })
    }

    fn setup_with(
        body: &'static str,
        auto_attach: bool,
    ) -> (QualityReportBehavior<Recorder>, Arc<Mutex<Vec<String>>>) {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let mut options = Options::default();
        options.behavior.auto_attach = auto_attach;
        let fetcher = recording(Arc::clone(&urls), body);
        (QualityReportBehavior::new(fetcher, &options), urls)
    }

    fn setup(
        auto_attach: bool,
    ) -> (QualityReportBehavior<Recorder>, Arc<Mutex<Vec<String>>>) {
        setup_with(BODY, auto_attach)
    }

    #[test]
    fn registers_both_themes_once() {
        let (mut behavior, _) = setup(false);
        let mut registry = Registry::default();
        behavior.register(&mut registry);
        behavior.register(&mut registry);
        assert_eq!(registry.themes, ["emdb-qscore-report", "emdb-ai-report"]);
        assert_eq!(registry.labels, [LABEL_PROVIDER]);
        assert_eq!(
            behavior.theme("emdb-ai-report").unwrap().label(),
            "Atom inclusion Report"
        );

        behavior.unregister(&mut registry);
        assert!(registry.themes.is_empty());
        assert!(registry.labels.is_empty());
    }

    #[test]
    fn theme_attach_create_release() {
        let (behavior, urls) = setup(false);
        let model = two_chain_model();
        let theme = behavior.theme("emdb-ai-report").unwrap();
        assert!(theme.is_applicable(Some(&model)));

        let store = theme.ensure_attached(&model).unwrap();
        assert_eq!(store.parsed_as(), ParsedAs::Score);
        assert_eq!(
            urls.lock().unwrap().as_slice(),
            ["https://www.ebi.ac.uk/emdb/api/analysis/model/scores/1abc?metric=ai"]
        );
        assert_eq!(behavior.provider().get(&model).unwrap().ref_count, 1);

        let colors = theme.create(&model);
        assert_eq!(colors.granularity(), Granularity::Group);
        assert_eq!(colors.metric(), Metric::Ai);
        assert_eq!(colors.color(ResidueIndex(1)).to_string(), "#7AFCFC");

        theme.release(&model);
        assert!(behavior.provider().get(&model).is_none());
        assert_eq!(
            theme.create(&model).granularity(),
            Granularity::Uniform
        );
    }

    #[test]
    fn auto_attach_on_load_takes_no_reference() {
        let (behavior, urls) = setup(false);
        let model = two_chain_model();
        assert!(behavior.on_model_loaded(&model).is_none());
        assert!(urls.lock().unwrap().is_empty());

        let (mut behavior, urls) = setup(true);
        assert!(behavior.on_model_loaded(&model).unwrap().is_ok());
        assert_eq!(urls.lock().unwrap().len(), 1);
        assert_eq!(behavior.provider().get(&model).unwrap().ref_count, 0);

        // not a PDB entry
        let local = two_chain_builder("my_model", 1).build();
        assert!(behavior.on_model_loaded(&local).is_none());

        assert!(behavior.update(BehaviorOptions {
            auto_attach: false,
            show_tooltip: true,
        }));
        assert!(!behavior.provider().auto_attach());
    }

    #[test]
    fn labels_follow_tooltip_toggle() {
        let (mut behavior, _) = setup(false);
        let model = two_chain_model();
        let theme = behavior.theme("emdb-qscore-report").unwrap();
        let _ = theme.ensure_attached(&model).unwrap();

        let target = PickTarget::Residue {
            model: model.id(),
            residue: ResidueIndex(1),
        };
        assert_eq!(behavior.label(&target).as_deref(), Some("Score: 0.9 (ai)"));

        let other = PickTarget::Residue {
            model: ModelId(u64::MAX),
            residue: ResidueIndex(1),
        };
        assert_eq!(behavior.label(&other), None);

        assert!(!behavior.update(BehaviorOptions {
            auto_attach: false,
            show_tooltip: false,
        }));
        assert_eq!(behavior.label(&target), None);
    }

    #[test]
    fn clash_report_colors_and_labels_through_provider() {
        let (mut behavior, urls) = setup_with(CLASH, false);
        let model = two_chain_model();
        let theme = behavior.theme("emdb-qscore-report").unwrap();

        let store = theme.ensure_attached(&model).unwrap();
        assert_eq!(store.parsed_as(), ParsedAs::Issues);
        assert_eq!(urls.lock().unwrap().len(), 1);

        let colors = theme.create(&model);
        assert_eq!(colors.color(ResidueIndex(2)), IssueTier::Clash.color());
        assert_eq!(colors.color(ResidueIndex(0)), NEUTRAL_GRAY);
        assert_eq!(colors.color(ResidueIndex(7)), NEUTRAL_GRAY);

        let clash = PickTarget::Residue {
            model: model.id(),
            residue: ResidueIndex(2),
        };
        let label = behavior.label(&clash).unwrap();
        assert!(label.contains("Clashes"), "{label}");
        let quiet = PickTarget::Residue {
            model: model.id(),
            residue: ResidueIndex(0),
        };
        assert_eq!(
            behavior.label(&quiet).as_deref(),
            Some("Validation: No Issues")
        );

        let _ = behavior.update(BehaviorOptions {
            auto_attach: false,
            show_tooltip: false,
        });
        assert_eq!(behavior.label(&clash), None);

        let theme = behavior.theme("emdb-qscore-report").unwrap();
        theme.release(&model);
        assert!(behavior.provider().get(&model).is_none());
    }
}
