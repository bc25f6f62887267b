//! Raw transcript, one chat line per line. Replays read this format back.

use super::{RenderContext, Writer, WriterError};

pub struct TextLogWriter;

impl Writer for TextLogWriter {
    fn name(&self) -> &'static str {
        "text-log"
    }

    fn realtime(&self) -> bool {
        true
    }

    fn is_raw_log(&self) -> bool {
        true
    }

    fn format(&self, ctx: &RenderContext<'_>) -> Result<String, WriterError> {
        Ok(ctx.meeting.lines().join("\n"))
    }
}
