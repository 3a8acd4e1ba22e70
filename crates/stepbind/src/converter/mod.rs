//! Step argument conversion.
//!
//! [`StepArgumentTypeConverter`] turns raw step arguments into values of a
//! parameter's declared type. Registered transformations take precedence;
//! values that already have the target type pass through; everything else
//! goes through simple conversion.

use std::ptr;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::binding::StepArgumentTransformationBinding;
use crate::binding_type::BindingType;
use crate::config::DEFAULT_MAX_TRANSFORMATION_DEPTH;
use crate::context::InvocationContext;
use crate::culture::BindingCulture;
use crate::invoker::BindingInvoker;
use crate::registry::BindingRegistry;
use crate::value::StepValue;

mod error;
pub(crate) mod simple;

pub use error::ConversionError;

#[derive(Clone)]
struct ChainLink<'r> {
    transformation: &'r StepArgumentTransformationBinding,
    input: Option<String>,
}

/// Converts step arguments using a registry's transformations.
///
/// # Examples
///
/// ```
/// use stepbind::{
///     BindingCulture, BindingRegistry, BindingType, DefaultBindingInvoker,
///     InvocationContext, StepArgumentTypeConverter, StepValue,
/// };
///
/// let registry = BindingRegistry::new();
/// let converter = StepArgumentTypeConverter::new(&registry, &DefaultBindingInvoker);
/// let mut ctx = InvocationContext::default();
/// let value = converter.convert_blocking(
///     StepValue::new(String::from("42")),
///     &BindingType::of::<i32>(),
///     &mut ctx,
///     &BindingCulture::invariant(),
/// )?;
/// assert_eq!(value.downcast::<i32>().ok(), Some(42));
/// # Ok::<(), stepbind::ConversionError>(())
/// ```
#[derive(Clone, Copy)]
pub struct StepArgumentTypeConverter<'r> {
    registry: &'r BindingRegistry,
    invoker: &'r dyn BindingInvoker,
    max_depth: usize,
}

impl<'r> StepArgumentTypeConverter<'r> {
    /// Create a converter invoking transformations through `invoker`.
    #[must_use]
    pub fn new(registry: &'r BindingRegistry, invoker: &'r dyn BindingInvoker) -> Self {
        Self {
            registry,
            invoker,
            max_depth: DEFAULT_MAX_TRANSFORMATION_DEPTH,
        }
    }

    /// Bound nested transformation applications.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Convert `value` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when no conversion applies, the text is
    /// malformed, or a transformation fails, cycles or nests too deeply.
    pub async fn convert(
        &self,
        value: StepValue,
        target: &BindingType,
        ctx: &mut InvocationContext,
        culture: &BindingCulture,
    ) -> Result<StepValue, ConversionError> {
        self.convert_in_chain(value, target, ctx, culture, Vec::new())
            .await
    }

    /// Convert `value` to `target`, blocking on asynchronous transformations.
    ///
    /// # Errors
    ///
    /// As for [`convert`](Self::convert).
    pub fn convert_blocking(
        &self,
        value: StepValue,
        target: &BindingType,
        ctx: &mut InvocationContext,
        culture: &BindingCulture,
    ) -> Result<StepValue, ConversionError> {
        futures::executor::block_on(self.convert(value, target, ctx, culture))
    }

    /// Report whether `value` could be converted to `target` without
    /// running any transformation.
    #[must_use]
    pub fn can_convert(
        &self,
        value: &StepValue,
        target: &BindingType,
        culture: &BindingCulture,
    ) -> bool {
        self.find_transformation(value, target, None).is_some()
            || target
                .as_runtime()
                .is_some_and(|runtime| runtime.accepts(value))
            || Self::can_convert_simple(value, target, culture)
    }

    /// Convert without transformations.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the value cannot be converted.
    pub fn convert_simple(
        value: &StepValue,
        target: &BindingType,
        culture: &BindingCulture,
    ) -> Result<StepValue, ConversionError> {
        simple::convert_simple(target, value, culture)
    }

    /// Report whether simple conversion succeeds.
    #[must_use]
    pub fn can_convert_simple(
        value: &StepValue,
        target: &BindingType,
        culture: &BindingCulture,
    ) -> bool {
        simple::convert_simple(target, value, culture).is_ok()
    }

    /// The lowest-order transformation for `value`, with the next candidate
    /// when it shares that order. Silent, as matching calls it per candidate.
    fn find_transformation(
        &self,
        value: &StepValue,
        target: &BindingType,
        previous: Option<&StepArgumentTransformationBinding>,
    ) -> Option<TransformationChoice<'r>> {
        let mut candidates: Vec<&'r StepArgumentTransformationBinding> = self
            .registry
            .get_step_transformations()
            .iter()
            .map(Arc::as_ref)
            .filter(|candidate| previous.is_none_or(|previous| !ptr::eq(*candidate, previous)))
            .filter(|candidate| candidate.can_transform(value, target))
            .collect();
        candidates.sort_by_key(|candidate| candidate.order());
        let mut ranked = candidates.into_iter();
        let chosen = ranked.next()?;
        let tied = ranked.next().filter(|next| next.order() == chosen.order());
        Some((chosen, tied))
    }

    fn convert_in_chain<'a>(
        &'a self,
        value: StepValue,
        target: &'a BindingType,
        ctx: &'a mut InvocationContext,
        culture: &'a BindingCulture,
        chain: Vec<ChainLink<'r>>,
    ) -> LocalBoxFuture<'a, Result<StepValue, ConversionError>> {
        async move {
            let previous = chain.last().map(|link| link.transformation);
            if let Some((transformation, tied)) =
                self.find_transformation(&value, target, previous)
            {
                if let Some(tied) = tied {
                    log::warn!(
                        "multiple step argument transformations with order {} apply to \
                         {target}: {transformation} and {tied}; using {transformation}",
                        transformation.order()
                    );
                }
                log::debug!("converting to {target} with {transformation}");
                let input = value.as_text().map(str::to_string);
                if chain.iter().any(|link| {
                    ptr::eq(link.transformation, transformation) && link.input == input
                }) {
                    return Err(ConversionError::TransformationCycle {
                        target: target.to_string(),
                        chain: describe_chain(&chain, transformation),
                    });
                }
                if chain.len() >= self.max_depth {
                    return Err(ConversionError::DepthExceeded {
                        target: target.to_string(),
                        limit: self.max_depth,
                    });
                }
                let mut chain = chain;
                chain.push(ChainLink {
                    transformation,
                    input,
                });
                return self
                    .apply(transformation, value, target, ctx, culture, chain)
                    .await;
            }
            if target
                .as_runtime()
                .is_some_and(|runtime| runtime.accepts(&value))
            {
                return Ok(value);
            }
            simple::convert_simple(target, &value, culture)
        }
        .boxed_local()
    }

    async fn apply(
        &self,
        transformation: &'r StepArgumentTransformationBinding,
        value: StepValue,
        target: &BindingType,
        ctx: &mut InvocationContext,
        culture: &BindingCulture,
        chain: Vec<ChainLink<'r>>,
    ) -> Result<StepValue, ConversionError> {
        let method = transformation.method();
        let captured = transformation
            .regex()
            .zip(value.as_text())
            .and_then(|(regex, text)| regex.captures(text))
            .map(|captures| {
                captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect::<Vec<_>>()
            });
        let mut arguments = Vec::with_capacity(method.parameters().len());
        if let Some(captured) = captured {
            if captured.len() != method.parameters().len() {
                return Err(ConversionError::ArgumentCount {
                    transformation: method.to_string(),
                    expected: method.parameters().len(),
                    actual: captured.len(),
                });
            }
            for (text, parameter) in captured.into_iter().zip(method.parameters()) {
                let converted = self
                    .convert_in_chain(
                        StepValue::new(text),
                        parameter.binding_type(),
                        &mut *ctx,
                        culture,
                        chain.clone(),
                    )
                    .await?;
                arguments.push(converted);
            }
        } else if let Some(parameter) = method.parameters().first() {
            let converted = self
                .convert_in_chain(value, parameter.binding_type(), &mut *ctx, culture, chain)
                .await?;
            arguments.push(converted);
        }

        let invocation = self
            .invoker
            .invoke(method, ctx, arguments)
            .await
            .map_err(|source| ConversionError::TransformationFailed {
                transformation: method.to_string(),
                source,
            })?;
        match invocation.value {
            Some(result) if target.as_runtime().is_none_or(|runtime| runtime.accepts(&result)) => {
                Ok(result)
            }
            other => Err(ConversionError::UnexpectedResult {
                transformation: method.to_string(),
                target: target.to_string(),
                actual: other.map_or_else(|| "nothing".to_string(), |result| result.type_name()),
            }),
        }
    }
}

impl std::fmt::Debug for StepArgumentTypeConverter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepArgumentTypeConverter")
            .field(
                "transformations",
                &self.registry.get_step_transformations().len(),
            )
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

type TransformationChoice<'r> = (
    &'r StepArgumentTransformationBinding,
    Option<&'r StepArgumentTransformationBinding>,
);

fn describe_chain(chain: &[ChainLink<'_>], next: &StepArgumentTransformationBinding) -> String {
    chain
        .iter()
        .map(|link| link.transformation.method().name())
        .chain(std::iter::once(next.method().name()))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests;
