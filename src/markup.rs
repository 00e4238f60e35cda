use std::fmt::Write as _;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

pub trait Render {
    fn render_to(&self, out: &mut String);
}

impl Render for Markup {
    fn render_to(&self, out: &mut String) {
        out.push_str(&self.0);
    }
}

impl Render for str {
    fn render_to(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl Render for String {
    fn render_to(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render_to(&self, out: &mut String) {
        (**self).render_to(out);
    }
}

macro_rules! render_display {
    ($($ty:ty),*) => {
        $(impl Render for $ty {
            fn render_to(&self, out: &mut String) {
                let _ = write!(out, "{self}");
            }
        })*
    };
}

render_display!(i64, u64, usize);

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(html: &'static str) -> Self {
        Self(html.to_string())
    }

    /// Fills each `{}` in `template` with the next argument, in order.
    pub fn fragment(template: &'static str, args: &[&dyn Render]) -> Self {
        let mut out = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut pieces = template.split("{}").peekable();
        while let Some(piece) = pieces.next() {
            out.push_str(piece);
            if pieces.peek().is_some() {
                match args.next() {
                    Some(arg) => arg.render_to(&mut out),
                    None => debug_assert!(false, "missing argument for template {template:?}"),
                }
            }
        }
        debug_assert!(args.next().is_none(), "unused arguments for template {template:?}");
        Self(out)
    }

    pub fn push(&mut self, value: &dyn Render) {
        value.render_to(&mut self.0);
    }

    pub fn push_raw(&mut self, html: &'static str) {
        self.0.push_str(html);
    }

    /// Renders each item with `f` and concatenates the results.
    pub fn join<T>(items: impl IntoIterator<Item = T>, f: impl Fn(T) -> Markup) -> Self {
        let mut out = Markup::new();
        for item in items {
            out.push(&f(item));
        }
        out
    }

    pub fn when(condition: bool, f: impl FnOnce() -> Markup) -> Self {
        if condition { f() } else { Markup::new() }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
