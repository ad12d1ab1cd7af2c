//! Template engine for pages and demo blocks.

use minijinja::{context, Environment};
use serde::Serialize;

/// A navigation item.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
    /// Child items
    pub children: Vec<NavItem>,
}

/// A table of contents entry.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub id: String,
    pub level: u8,
}

/// Context for rendering a page.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Rendered content HTML
    pub content: String,
    /// Navigation items
    pub nav: Vec<NavItem>,
    /// Table of contents
    pub toc: Vec<TocEntry>,
    /// Base URL
    pub base_url: String,
    /// Extra stylesheet URLs
    pub styles: Vec<String>,
    /// Extra scripts appended to the body (dev client)
    pub scripts: Vec<String>,
}

/// View model of one rendered demo block.
#[derive(Debug, Clone, Serialize)]
pub struct DemoView {
    pub id: String,
    pub kind: String,
    pub layout: String,
    pub direction: String,
    pub language: String,
    pub show_code: bool,
    pub code_visible: bool,
    /// Render a textarea editor instead of a static code panel
    pub editable: bool,
    pub source: String,
    pub srcdoc: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("doc.html", DOC_TEMPLATE),
            ("nav.html", NAV_TEMPLATE),
            ("demo.html", DEMO_TEMPLATE),
            ("control_bar.html", CONTROL_BAR_TEMPLATE),
            ("demo_error.html", DEMO_ERROR_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("Built-in template failed to parse");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, context: &Context) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(context)
    }

    /// Render a demo block.
    pub fn render_demo(&self, view: &DemoView) -> Result<String, minijinja::Error> {
        self.env.get_template("demo.html")?.render(view)
    }

    /// Render the placeholder shown for a demo whose directive is invalid.
    pub fn render_demo_error(
        &self,
        id: &str,
        message: &str,
        source: &str,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template("demo_error.html")?
            .render(context! { id, message, source })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}<link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  <button type="button" class="menu-btn" aria-label="Menu">&#9776;</button>
  <div class="layout">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="{{ base_url }}assets/main.js"></script>
  {% for script in scripts %}<script src="{{ script }}"></script>
  {% endfor %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  <div class="content">
    {{ content | safe }}
  </div>
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}"><a href="#{{ entry.id }}">{{ entry.title }}</a></li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<div class="nav-header">
  <a href="{{ base_url }}" class="nav-logo">{{ site_title }}</a>
</div>
<ul class="nav-list">
{% for item in nav %}
  <li class="nav-item">
    <a href="{{ item.path }}">{{ item.title }}</a>
    {% if item.children %}
    <ul class="nav-children">
      {% for child in item.children %}
      <li class="nav-item"><a href="{{ child.path }}">{{ child.title }}</a></li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const DEMO_TEMPLATE: &str = r##"<div class="dpdb" id="{{ id }}" data-kind="{{ kind }}">
  <div class="dpdb__container dpdb__container-{{ layout }} dpdb__display-{{ direction }}">
    {% if show_code %}
    <div class="dpdb__playground-wrapper{% if not code_visible %} dpdb__hidden{% endif %}">
      {% if editable %}
      <textarea class="dpdb__editor" data-demo="{{ id }}" spellcheck="false">{{ source }}</textarea>
      {% else %}
      <pre class="dpdb__code"><code class="language-{{ language }}">{{ source }}</code></pre>
      {% endif %}
    </div>
    {% endif %}
    {% if direction == "column" %}{% include "control_bar.html" %}{% endif %}
    <div class="dpdb__runner-wrapper">
      <iframe class="dpdb__runner" title="{{ kind }} demo" sandbox="allow-scripts" srcdoc="{{ srcdoc }}"></iframe>
    </div>
  </div>
  {% if direction == "row" %}{% include "control_bar.html" %}{% endif %}
</div>"##;

const CONTROL_BAR_TEMPLATE: &str = r##"{% if show_code %}<div class="dpdb__control-bar">
  <button type="button" class="dpdb__toggle" data-demo="{{ id }}" aria-expanded="{{ code_visible }}">{% if code_visible %}Hide code{% else %}Show code{% endif %}</button>
  <button type="button" class="dpdb__copy" data-demo="{{ id }}">Copy</button>
</div>{% endif %}"##;

const DEMO_ERROR_TEMPLATE: &str = r##"<div class="dpdb dpdb--invalid" id="{{ id }}">
  <pre style="color: red">Invalid demo option: {{ message }}</pre>
  <pre class="dpdb__code"><code>{{ source }}</code></pre>
</div>"##;
