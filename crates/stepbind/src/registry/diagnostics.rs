//! JSON export of the registry for tooling.

use serde::Serialize;

use super::BindingRegistry;
use crate::binding::SourceLocation;
use crate::scope::BindingScope;

#[derive(Serialize)]
struct DumpedScope {
    tag: Option<String>,
    feature_title: Option<String>,
    scenario_title: Option<String>,
}

impl From<&BindingScope> for DumpedScope {
    fn from(scope: &BindingScope) -> Self {
        Self {
            tag: scope.tag().map(str::to_owned),
            feature_title: scope.feature_title().map(str::to_owned),
            scenario_title: scope.scenario_title().map(str::to_owned),
        }
    }
}

#[derive(Serialize)]
struct DumpedLocation {
    file: &'static str,
    line: u32,
}

impl From<SourceLocation> for DumpedLocation {
    fn from(location: SourceLocation) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

#[derive(Serialize)]
struct DumpedStep {
    step_type: &'static str,
    kind: &'static str,
    expression: Option<String>,
    method: String,
    scope: DumpedScope,
    valid: bool,
    error: Option<String>,
    obsolete: bool,
    location: Option<DumpedLocation>,
}

#[derive(Serialize)]
struct DumpedHook {
    hook_type: &'static str,
    order: i32,
    method: String,
    scope: DumpedScope,
    location: Option<DumpedLocation>,
}

#[derive(Serialize)]
struct DumpedTransformation {
    name: Option<String>,
    regex: Option<String>,
    order: i32,
    output_type: Option<String>,
    method: String,
    location: Option<DumpedLocation>,
}

#[derive(Serialize)]
struct RegistryDump {
    ready: bool,
    step_definitions: Vec<DumpedStep>,
    hooks: Vec<DumpedHook>,
    transformations: Vec<DumpedTransformation>,
    errors: Vec<String>,
}

pub(super) fn dump(registry: &BindingRegistry) -> serde_json::Result<String> {
    let step_definitions = registry
        .step_definitions()
        .map(|binding| DumpedStep {
            step_type: binding.step_type().as_str(),
            kind: binding.kind().as_str(),
            expression: binding.expression().map(str::to_owned),
            method: binding.method().to_string(),
            scope: binding.scope().into(),
            valid: binding.is_valid(),
            error: binding.error().map(str::to_owned),
            obsolete: binding.method().obsoletion().is_some(),
            location: binding.location().map(Into::into),
        })
        .collect();
    let hooks = registry
        .get_hooks(None)
        .into_iter()
        .map(|hook| DumpedHook {
            hook_type: hook.hook_type().as_str(),
            order: hook.order(),
            method: hook.method().to_string(),
            scope: hook.scope().into(),
            location: hook.location().map(Into::into),
        })
        .collect();
    let transformations = registry
        .get_step_transformations()
        .iter()
        .map(|transformation| DumpedTransformation {
            name: transformation.name().map(str::to_owned),
            regex: transformation.regex_source().map(str::to_owned),
            order: transformation.order(),
            output_type: transformation.output_type().map(ToString::to_string),
            method: transformation.method().to_string(),
            location: transformation.location().map(Into::into),
        })
        .collect();
    let dump = RegistryDump {
        ready: registry.is_ready(),
        step_definitions,
        hooks,
        transformations,
        errors: registry.errors().iter().map(ToString::to_string).collect(),
    };
    serde_json::to_string(&dump)
}
