// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Environment shared by the algorithms of a model run.
//!
//! The context owns the temporary layer store that algorithm outputs land
//! in, the list of layers to load into the project once the run is over,
//! the expression scope of the child currently executing and the user's
//! [`ProcessingSettings`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::settings::{InvalidGeometryCheck, ProcessingSettings};
use crate::engine::feedback::Feedback;
use crate::errors::AlgorithmError;
use crate::expression::ExpressionScope;
use crate::model::LayerHandle;

/// Layers keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: BTreeMap<String, LayerHandle>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer, replacing any earlier layer with the same id.
    pub fn add_layer(&mut self, layer: LayerHandle) {
        self.layers.insert(layer.id.clone(), layer);
    }

    pub fn layer(&self, id: &str) -> Option<&LayerHandle> {
        self.layers.get(id)
    }

    pub fn take_layer(&mut self, id: &str) -> Option<LayerHandle> {
        self.layers.remove(id)
    }

    /// Finds a layer by id, then by name, then by source uri.
    pub fn find(&self, identifier: &str) -> Option<&LayerHandle> {
        self.layers.get(identifier).or_else(|| {
            self.layers
                .values()
                .find(|l| l.name == identifier)
                .or_else(|| self.layers.values().find(|l| l.source == identifier))
        })
    }

    /// Moves every layer of `other` into this store.
    pub fn transfer_layers_from(&mut self, other: &mut LayerStore) {
        self.layers.append(&mut other.layers);
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerHandle> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

/// Hook run on an output layer once it has been named, before it joins the
/// project layers. See [`ProcessingContext::load_layers_on_completion`].
pub trait LayerPostProcessor: Send + Sync {
    fn post_process(
        &self,
        layer: &mut LayerHandle,
        context: &ProcessingContext,
        feedback: &dyn Feedback,
    );
}

/// How an output layer should appear once loaded on completion.
#[derive(Clone, Default)]
pub struct LayerDetails {
    /// Name to give the loaded layer
    pub name: String,
    /// Use `name` even when the settings prefer file names
    pub force_name: bool,
    /// Output parameter the layer was produced for
    pub output_name: String,
    pub post_processor: Option<Arc<dyn LayerPostProcessor>>,
}

impl fmt::Debug for LayerDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerDetails")
            .field("name", &self.name)
            .field("force_name", &self.force_name)
            .field("output_name", &self.output_name)
            .field("post_processor", &self.post_processor.is_some())
            .finish()
    }
}

impl LayerDetails {
    pub fn new(name: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_name: output_name.into(),
            ..Self::default()
        }
    }

    pub fn forced(mut self) -> Self {
        self.force_name = true;
        self
    }

    pub fn with_post_processor(mut self, post_processor: Arc<dyn LayerPostProcessor>) -> Self {
        self.post_processor = Some(post_processor);
        self
    }

    /// Names `layer` from these details.
    ///
    /// A file backed layer is named after its `layername=` part, or after
    /// the file's base name, when `prefer_filename` is set and the name is
    /// not forced. An empty details name always falls back to the file.
    pub fn set_output_layer_name(&self, layer: &mut LayerHandle, prefer_filename: bool) {
        let use_file =
            (!self.force_name && prefer_filename && !layer.temporary) || self.name.is_empty();
        if !use_file {
            layer.name = self.name.clone();
            return;
        }

        let (path, layer_name) = layer.decode_source();
        if let Some(layer_name) = layer_name.filter(|n| !n.is_empty()) {
            layer.name = layer_name;
            return;
        }

        let base_name = Path::new(&path)
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| f.split('.').next())
            .filter(|b| !b.is_empty());
        match base_name {
            Some(base_name) => layer.name = base_name.to_string(),
            None if !self.name.is_empty() => layer.name = self.name.clone(),
            None => {}
        }
    }
}

/// Applies the invalid geometry policy to one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidGeometryCallback {
    check: InvalidGeometryCheck,
    source_name: Option<String>,
}

impl InvalidGeometryCallback {
    pub fn check(&self) -> InvalidGeometryCheck {
        self.check
    }

    /// Called for a feature whose geometry is invalid.
    ///
    /// Aborting returns an error; skipping reports it to `feedback` and lets
    /// the algorithm carry on without the feature.
    pub fn call(&self, feature_id: i64, feedback: &dyn Feedback) -> Result<(), AlgorithmError> {
        match self.check {
            InvalidGeometryCheck::NoCheck => Ok(()),
            InvalidGeometryCheck::AbortOnInvalid => Err(AlgorithmError::InvalidGeometry {
                feature_id,
                source_name: self.source_name.clone(),
            }),
            InvalidGeometryCheck::SkipInvalid => {
                let message = match self.source_name.as_deref() {
                    Some(name) if !name.is_empty() => format!(
                        "Feature ({}) from “{}” has invalid geometry and has been skipped. Please fix the geometry or change the Processing setting to the “Ignore invalid input features” option.",
                        feature_id, name
                    ),
                    _ => format!(
                        "Feature ({}) has invalid geometry and has been skipped. Please fix the geometry or change the Processing setting to the “Ignore invalid input features” option.",
                        feature_id
                    ),
                };
                feedback.report_error(&message, false);
                Ok(())
            }
        }
    }
}

/// Per-run environment handed to every algorithm.
#[derive(Debug, Default)]
pub struct ProcessingContext {
    settings: ProcessingSettings,
    invalid_geometry_check: InvalidGeometryCheck,
    temporary_layer_store: LayerStore,
    project_layers: LayerStore,
    layers_to_load_on_completion: BTreeMap<String, LayerDetails>,
    expression_scope: ExpressionScope,
}

impl ProcessingContext {
    pub fn new(settings: ProcessingSettings) -> Self {
        Self {
            invalid_geometry_check: settings.invalid_geometry_check,
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    pub fn invalid_geometry_check(&self) -> InvalidGeometryCheck {
        self.invalid_geometry_check
    }

    pub fn set_invalid_geometry_check(&mut self, check: InvalidGeometryCheck) {
        self.invalid_geometry_check = check;
    }

    /// Callback for features read from `source_name`, or `None` when
    /// geometries are not checked.
    pub fn invalid_geometry_callback(
        &self,
        source_name: Option<&str>,
    ) -> Option<InvalidGeometryCallback> {
        match self.invalid_geometry_check {
            InvalidGeometryCheck::NoCheck => None,
            check => Some(InvalidGeometryCallback {
                check,
                source_name: source_name.map(str::to_string),
            }),
        }
    }

    pub fn temporary_layer_store(&self) -> &LayerStore {
        &self.temporary_layer_store
    }

    pub fn temporary_layer_store_mut(&mut self) -> &mut LayerStore {
        &mut self.temporary_layer_store
    }

    pub fn project_layers(&self) -> &LayerStore {
        &self.project_layers
    }

    pub fn project_layers_mut(&mut self) -> &mut LayerStore {
        &mut self.project_layers
    }

    /// Looks a layer up in the temporary store first, then in the project.
    pub fn get_map_layer(&self, identifier: &str) -> Option<&LayerHandle> {
        self.temporary_layer_store
            .find(identifier)
            .or_else(|| self.project_layers.find(identifier))
    }

    /// Removes a result layer from the temporary store, handing ownership
    /// to the caller.
    pub fn take_result_layer(&mut self, id: &str) -> Option<LayerHandle> {
        self.temporary_layer_store.take_layer(id)
    }

    pub fn layers_to_load_on_completion(&self) -> &BTreeMap<String, LayerDetails> {
        &self.layers_to_load_on_completion
    }

    pub fn set_layers_to_load_on_completion(&mut self, layers: BTreeMap<String, LayerDetails>) {
        self.layers_to_load_on_completion = layers;
    }

    pub fn add_layer_to_load_on_completion(
        &mut self,
        layer_id: impl Into<String>,
        details: LayerDetails,
    ) {
        self.layers_to_load_on_completion.insert(layer_id.into(), details);
    }

    pub fn will_load_layer_on_completion(&self, layer_id: &str) -> bool {
        self.layers_to_load_on_completion.contains_key(layer_id)
    }

    pub fn layer_to_load_on_completion_details(
        &mut self,
        layer_id: &str,
    ) -> Option<&mut LayerDetails> {
        self.layers_to_load_on_completion.get_mut(layer_id)
    }

    /// Moves the layers to load and the temporary layers of `other` into
    /// this context, leaving `other` without them.
    pub fn take_results_from(&mut self, other: &mut ProcessingContext) {
        let layers = std::mem::take(&mut other.layers_to_load_on_completion);
        self.set_layers_to_load_on_completion(layers);
        self.temporary_layer_store
            .transfer_layers_from(&mut other.temporary_layer_store);
    }

    /// Names `layer` from `details` using this context's settings.
    pub fn apply_output_layer_name(&self, details: &LayerDetails, layer: &mut LayerHandle) {
        details.set_output_layer_name(layer, self.settings.prefer_filename_as_layer_name);
    }

    /// Loads every layer queued for completion into the project layers.
    ///
    /// Each layer is taken from the temporary store (or the project, when
    /// already there), named from its details and handed to its post
    /// processor. Layers that cannot be found are reported as warnings. The
    /// queue is empty afterwards. Returns the ids of the loaded layers.
    pub fn load_layers_on_completion(&mut self, feedback: &dyn Feedback) -> Vec<String> {
        let queued = std::mem::take(&mut self.layers_to_load_on_completion);
        let mut loaded = Vec::with_capacity(queued.len());

        for (layer_id, details) in queued {
            let layer = self
                .temporary_layer_store
                .take_layer(&layer_id)
                .or_else(|| self.project_layers.take_layer(&layer_id));
            let Some(mut layer) = layer else {
                feedback.push_warning(&format!(
                    "Could not load layer '{}' for output {}",
                    layer_id, details.output_name
                ));
                continue;
            };

            self.apply_output_layer_name(&details, &mut layer);
            if let Some(post_processor) = &details.post_processor {
                post_processor.post_process(&mut layer, self, feedback);
            }
            self.project_layers.add_layer(layer);
            loaded.push(layer_id);
        }

        loaded
    }

    pub fn expression_scope(&self) -> &ExpressionScope {
        &self.expression_scope
    }

    pub fn set_expression_scope(&mut self, scope: ExpressionScope) {
        self.expression_scope = scope;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::feedback::ProcessingFeedback;

    fn file_layer(source: &str) -> LayerHandle {
        LayerHandle::vector("roads_1", "roads").with_source("ogr", source)
    }

    #[test]
    fn test_output_layer_name_prefers_layername_part() {
        let details = LayerDetails::new("Buffered", "OUTPUT");
        let mut layer = file_layer("/data/out.gpkg|layername=buffered_roads");
        details.set_output_layer_name(&mut layer, true);
        assert_eq!(layer.name, "buffered_roads");
    }

    #[test]
    fn test_output_layer_name_uses_base_name() {
        let details = LayerDetails::new("Buffered", "OUTPUT");
        let mut layer = file_layer("/data/out.tar.gz");
        details.set_output_layer_name(&mut layer, true);
        assert_eq!(layer.name, "out");
    }

    #[test]
    fn test_output_layer_name_respects_forced_name() {
        let details = LayerDetails::new("Buffered", "OUTPUT").forced();
        let mut layer = file_layer("/data/out.gpkg");
        details.set_output_layer_name(&mut layer, true);
        assert_eq!(layer.name, "Buffered");

        let details = LayerDetails::new("Buffered", "OUTPUT");
        let mut layer = file_layer("/data/out.gpkg");
        details.set_output_layer_name(&mut layer, false);
        assert_eq!(layer.name, "Buffered");
    }

    #[test]
    fn test_output_layer_name_for_temporary_layers() {
        let details = LayerDetails::new("Buffered", "OUTPUT");
        let mut layer = file_layer("memory?geometry=Point").into_temporary();
        details.set_output_layer_name(&mut layer, true);
        assert_eq!(layer.name, "Buffered");

        let details = LayerDetails::new("", "OUTPUT");
        let mut layer = file_layer("/tmp/scratch.shp").into_temporary();
        details.set_output_layer_name(&mut layer, true);
        assert_eq!(layer.name, "scratch");
    }

    #[test]
    fn test_take_results_from() {
        let mut child = ProcessingContext::default();
        child
            .temporary_layer_store_mut()
            .add_layer(LayerHandle::vector("tmp_1", "tmp"));
        child.add_layer_to_load_on_completion("tmp_1", LayerDetails::new("Result", "OUTPUT"));

        let mut parent = ProcessingContext::default();
        parent.take_results_from(&mut child);

        assert!(parent.will_load_layer_on_completion("tmp_1"));
        assert!(parent.temporary_layer_store().layer("tmp_1").is_some());
        assert!(child.layers_to_load_on_completion().is_empty());
        assert!(child.temporary_layer_store().is_empty());

        let taken = parent.take_result_layer("tmp_1").unwrap();
        assert_eq!(taken.name, "tmp");
        assert!(parent.get_map_layer("tmp_1").is_none());
    }

    #[test]
    fn test_get_map_layer_search_order() {
        let mut context = ProcessingContext::default();
        context
            .project_layers_mut()
            .add_layer(LayerHandle::vector("p1", "parcels").with_source("ogr", "/data/parcels.shp"));
        context
            .temporary_layer_store_mut()
            .add_layer(LayerHandle::vector("t1", "parcels"));

        assert_eq!(context.get_map_layer("parcels").unwrap().id, "t1");
        assert_eq!(context.get_map_layer("p1").unwrap().id, "p1");
        assert_eq!(context.get_map_layer("/data/parcels.shp").unwrap().id, "p1");
        assert!(context.get_map_layer("missing").is_none());
    }

    #[test]
    fn test_invalid_geometry_policies() {
        let feedback = ProcessingFeedback::new(false);
        let mut context = ProcessingContext::default();

        let abort = context.invalid_geometry_callback(Some("roads")).unwrap();
        let error = abort.call(7, &feedback).unwrap_err();
        assert!(error.to_string().starts_with("Feature (7) from “roads” has invalid geometry."));

        context.set_invalid_geometry_check(InvalidGeometryCheck::SkipInvalid);
        let skip = context.invalid_geometry_callback(None).unwrap();
        assert!(skip.call(3, &feedback).is_ok());
        assert!(feedback
            .text_log()
            .starts_with("Feature (3) has invalid geometry and has been skipped."));

        context.set_invalid_geometry_check(InvalidGeometryCheck::NoCheck);
        assert!(context.invalid_geometry_callback(Some("roads")).is_none());
    }

    #[test]
    fn test_context_takes_check_from_settings() {
        let settings = ProcessingSettings {
            invalid_geometry_check: InvalidGeometryCheck::SkipInvalid,
            ..ProcessingSettings::default()
        };
        let context = ProcessingContext::new(settings);
        assert_eq!(context.invalid_geometry_check(), InvalidGeometryCheck::SkipInvalid);
    }

    struct Suffix(&'static str);

    impl LayerPostProcessor for Suffix {
        fn post_process(
            &self,
            layer: &mut LayerHandle,
            context: &ProcessingContext,
            feedback: &dyn Feedback,
        ) {
            layer.name.push_str(self.0);
            feedback.push_info(&format!("{} project layers", context.project_layers().len()));
        }
    }

    #[test]
    fn test_load_layers_on_completion_names_and_post_processes() {
        let mut context = ProcessingContext::default();
        context
            .temporary_layer_store_mut()
            .add_layer(LayerHandle::vector("buffered_1", "memory").into_temporary());
        context.add_layer_to_load_on_completion(
            "buffered_1",
            LayerDetails::new("Buffered", "OUTPUT")
                .with_post_processor(Arc::new(Suffix(" (styled)"))),
        );
        context.add_layer_to_load_on_completion("missing_1", LayerDetails::new("Missing", "OTHER"));
        let feedback = ProcessingFeedback::new(false);

        let loaded = context.load_layers_on_completion(&feedback);

        assert_eq!(loaded, vec!["buffered_1".to_string()]);
        assert!(context.layers_to_load_on_completion().is_empty());
        assert!(context.temporary_layer_store().is_empty());
        let layer = context.project_layers().layer("buffered_1").unwrap();
        assert_eq!(layer.name, "Buffered (styled)");
        assert!(feedback.text_log().contains("Could not load layer 'missing_1' for output OTHER"));
        assert!(feedback.text_log().contains("0 project layers"));
    }
}
