use tracing::Level;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;

const CRATE_TARGET: &str = "athar";

// Custom filter for exact debug level matching
pub struct DebugOnlyFilter;

impl<S> Filter<S> for DebugOnlyFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        meta.level() == &Level::DEBUG && meta.target().starts_with(CRATE_TARGET)
    }
}

// Custom filter for error and warn levels
pub struct ErrorWarnFilter;

impl<S> Filter<S> for ErrorWarnFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        (meta.level() == &Level::ERROR || meta.level() == &Level::WARN) && meta.target().starts_with(CRATE_TARGET)
    }
}

// Info, warn and error from this crate
pub struct InfoAndAboveFilter;

impl<S> Filter<S> for InfoAndAboveFilter
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(
        &self,
        meta: &Metadata<'_>,
        _ctx: &Context<'_, S>,
    ) -> bool {
        meta.level() <= &Level::INFO && meta.target().starts_with(CRATE_TARGET)
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    #[test]
    fn test_level_ordering_matches_filter_assumption() {
        // More verbose levels compare greater.
        assert!(Level::ERROR <= Level::INFO);
        assert!(Level::WARN <= Level::INFO);
        assert!(!(Level::DEBUG <= Level::INFO));
    }
}
