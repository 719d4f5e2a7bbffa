//! XMLTV guide with one flat six hour block per channel.
//!
//! There is no real schedule behind the catalog, the block only gives players something to
//! show next to each channel.

use std::io;

use chrono::{DateTime, TimeDelta, Utc};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::normalize::StreamRecord;

pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S +0000";
pub const PROGRAMME_LENGTH: TimeDelta = TimeDelta::hours(6);

#[derive(Debug, Clone, Copy, Default)]
pub struct EpgOptions {
    /// Repeat the channel icon inside each programme
    pub programme_icons: bool,
}

/// Renders the guide for `records`, with every programme starting at `now`
///
/// # Errors
/// Errors only if the XML writer fails, which does not happen with an in-memory buffer
pub fn render_epg(
    records: &[StreamRecord],
    now: DateTime<Utc>,
    options: EpgOptions,
) -> io::Result<String> {
    let start = now.format(XMLTV_TIME_FORMAT).to_string();
    let stop = (now + PROGRAMME_LENGTH).format(XMLTV_TIME_FORMAT).to_string();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("tv")))?;

    for record in records {
        write(
            &mut writer,
            Event::Start(BytesStart::new("channel").with_attributes([("id", record.id.as_str())])),
        )?;
        write_text_element(&mut writer, "display-name", &[], &record.display_name)?;
        write_icon(&mut writer, &record.logo)?;
        write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    }

    for record in records {
        write(
            &mut writer,
            Event::Start(BytesStart::new("programme").with_attributes([
                ("start", start.as_str()),
                ("stop", stop.as_str()),
                ("channel", record.id.as_str()),
            ])),
        )?;
        write_text_element(&mut writer, "title", &[("lang", "en")], &record.display_name)?;
        if options.programme_icons {
            write_icon(&mut writer, &record.logo)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("programme")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("tv")))?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(io::Error::other)?;
    xml.push('\n');
    Ok(xml)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> io::Result<()> {
    write(
        writer,
        Event::Start(BytesStart::new(name).with_attributes(attributes.iter().copied())),
    )?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_icon(writer: &mut Writer<Vec<u8>>, logo: &str) -> io::Result<()> {
    if logo.is_empty() {
        return Ok(());
    }
    write(
        writer,
        Event::Empty(BytesStart::new("icon").with_attributes([("src", logo)])),
    )
}

// quick-xml changed the error type of `write_event` across releases, normalize it to io
fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> io::Result<()> {
    writer.write_event(event).map_err(io::Error::other)
}
