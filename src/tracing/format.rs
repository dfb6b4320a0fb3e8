use tracing::Event;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::registry::LookupSpan;

/// `LEVEL timestamp::engine::module:line::message`
#[derive(Debug, Clone)]
pub struct AtharFormat {
    pub engine_name: String,
}

/// Module path relative to the crate root, e.g. `pipeline::crawler::tracer:42`.
fn event_origin(
    module_path: Option<&str>,
    line: Option<u32>,
) -> String {
    let module = module_path.unwrap_or("athar");
    let module = module.strip_prefix("athar::").unwrap_or(module);
    format!("{}:{}", module, line.unwrap_or(0))
}

impl<S, N> FormatEvent<S, N> for AtharFormat
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        write!(
            writer,
            "{} {}::{}::{}::",
            metadata.level(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
            self.engine_name,
            event_origin(metadata.module_path(), metadata.line())
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_origin_is_crate_relative() {
        assert_eq!(event_origin(Some("athar::pipeline::crawler::tracer"), Some(42)), "pipeline::crawler::tracer:42");
        assert_eq!(event_origin(Some("muqtafi"), None), "muqtafi:0");
        assert_eq!(event_origin(None, Some(7)), "athar:7");
    }
}
