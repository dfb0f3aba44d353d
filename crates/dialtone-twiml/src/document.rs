//! A `<Response>` document under construction, one method per TwiML verb.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{Error, Result};

pub(crate) struct Document {
  writer: Writer<Cursor<Vec<u8>>>,
}

impl Document {
  /// XML declaration plus the opening `<Response>`.
  pub fn new() -> Result<Self> {
    let mut doc = Self {
      writer: Writer::new(Cursor::new(Vec::new())),
    };
    doc.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    doc.write(Event::Start(BytesStart::new("Response")))?;
    Ok(doc)
  }

  pub fn say(&mut self, text: &str) -> Result<&mut Self> {
    self.text_elem(BytesStart::new("Say"), text)?;
    Ok(self)
  }

  pub fn pause(&mut self, length_secs: u32) -> Result<&mut Self> {
    let length = length_secs.to_string();
    let mut el = BytesStart::new("Pause");
    el.push_attribute(("length", length.as_str()));
    self.write(Event::Empty(el))?;
    Ok(self)
  }

  pub fn play(&mut self, url: &str, loops: u32) -> Result<&mut Self> {
    let loops = loops.to_string();
    let mut el = BytesStart::new("Play");
    el.push_attribute(("loop", loops.as_str()));
    self.text_elem(el, url)?;
    Ok(self)
  }

  /// `<Gather>` collecting `num_digits` digits, posted to `action`, with a
  /// spoken prompt nested inside.
  pub fn gather(
    &mut self,
    action: &str,
    num_digits: u32,
    timeout_secs: u32,
    prompt: &str,
  ) -> Result<&mut Self> {
    let num_digits = num_digits.to_string();
    let timeout = timeout_secs.to_string();
    let mut el = BytesStart::new("Gather");
    el.push_attribute(("numDigits", num_digits.as_str()));
    el.push_attribute(("action", action));
    el.push_attribute(("method", "POST"));
    el.push_attribute(("timeout", timeout.as_str()));

    self.write(Event::Start(el))?;
    self.say(prompt)?;
    self.write(Event::End(BytesEnd::new("Gather")))?;
    Ok(self)
  }

  pub fn redirect(&mut self, url: &str) -> Result<&mut Self> {
    self.text_elem(BytesStart::new("Redirect"), url)?;
    Ok(self)
  }

  pub fn hangup(&mut self) -> Result<&mut Self> {
    self.write(Event::Empty(BytesStart::new("Hangup")))?;
    Ok(self)
  }

  /// Close `</Response>` and return the document text.
  pub fn finish(mut self) -> Result<String> {
    self.write(Event::End(BytesEnd::new("Response")))?;
    Ok(String::from_utf8(self.writer.into_inner().into_inner())?)
  }

  // ── Helpers ────────────────────────────────────────────────────────────

  fn write(&mut self, event: Event<'_>) -> Result<()> {
    self
      .writer
      .write_event(event)
      .map_err(|e| Error::Xml(e.to_string()))
  }

  fn text_elem(&mut self, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = start.to_end().into_owned();
    self.write(Event::Start(start))?;
    self.write(Event::Text(BytesText::new(text)))?;
    self.write(Event::End(end))
  }
}
