//! Tera rendering engine: [`TemplateRenderer`] and [`referenced_names`].
//!
//! Manifest templates are tiny and reused for every file a strategy touches,
//! so each distinct template string is compiled once and kept in the
//! renderer's Tera instance, keyed by its own text.
//!
//! Tera refuses to render variables missing from its context. Manifest
//! templates treat an unknown name as empty text instead, so before every
//! render the identifiers the template mentions are looked up in the model
//! and anything the model lacks is inserted as `""`.

use std::cell::RefCell;
use std::collections::BTreeSet;

use tera::{Context, Tera};

use crate::error::RenderError;
use crate::model::VariableModel;

// ---------------------------------------------------------------------------
// Identifier scan
// ---------------------------------------------------------------------------

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn scan_block(block: &str, out: &mut BTreeSet<String>) {
    let mut chars = block.char_indices().peekable();
    let mut prev: Option<char> = None;
    while let Some((start, c)) = chars.next() {
        if c == '"' || c == '\'' || c == '`' {
            // skip string literal
            for (_, q) in chars.by_ref() {
                if q == c {
                    break;
                }
            }
            prev = Some(c);
            continue;
        }
        if is_ident_start(c) && !prev.is_some_and(is_ident_continue) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if !is_ident_continue(n) {
                    break;
                }
                end = i + n.len_utf8();
                chars.next();
            }
            if prev != Some('.') {
                out.insert(block[start..end].to_string());
            }
            prev = block[..end].chars().last();
            continue;
        }
        prev = Some(c);
    }
}

/// Identifiers used inside `{{ … }}` and `{% … %}` blocks of `template`.
///
/// Attribute accesses (`a.b` → only `a`) and string literals are skipped.
/// Comment blocks are ignored.
pub fn referenced_names(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = match after.chars().next() {
            Some('{') => "}}",
            Some('%') => "%}",
            Some('#') => "#}",
            _ => {
                rest = after;
                continue;
            }
        };
        let body = &after[1..];
        let Some(end) = body.find(close) else { break };
        if close != "#}" {
            scan_block(&body[..end], &mut names);
        }
        rest = &body[end + close.len()..];
    }
    names
}

fn has_markup(template: &str) -> bool {
    template.contains("{{") || template.contains("{%") || template.contains("{#")
}

// ---------------------------------------------------------------------------
// TemplateRenderer
// ---------------------------------------------------------------------------

/// Renders manifest templates against a [`VariableModel`].
///
/// Rendering is deterministic: the same template and model always produce
/// the same string. Autoescaping is off because the values are paths.
pub struct TemplateRenderer {
    tera: RefCell<Tera>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        Self {
            tera: RefCell::new(tera),
        }
    }

    /// Fail if `template` is not valid template syntax.
    pub fn check(&self, template: &str) -> Result<(), RenderError> {
        if has_markup(template) {
            self.compile(template)?;
        }
        Ok(())
    }

    /// Substitute every variable reference in `template` with its value from
    /// `model`. Names the model does not define render as empty text.
    pub fn render<M>(&self, template: &str, model: &M) -> Result<String, RenderError>
    where
        M: VariableModel + ?Sized,
    {
        if !has_markup(template) {
            return Ok(template.to_string());
        }
        self.compile(template)?;

        let mut ctx = Context::new();
        for name in referenced_names(template) {
            let value = model.lookup(&name).unwrap_or_default();
            ctx.insert(name, value);
        }
        self.tera
            .borrow()
            .render(template, &ctx)
            .map_err(|source| template_err(template, source))
    }

    fn compile(&self, template: &str) -> Result<(), RenderError> {
        let mut tera = self.tera.borrow_mut();
        if tera.get_template_names().any(|name| name == template) {
            return Ok(());
        }
        tera.add_raw_template(template, template)
            .map_err(|source| template_err(template, source))
    }
}

fn template_err(template: &str, source: tera::Error) -> RenderError {
    RenderError::Template {
        template: template.to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
