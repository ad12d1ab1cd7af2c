//! Stylesheet and runtime script for generated pages.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Page theme plus demo block styles.
    pub fn generate_css() -> String {
        format!("{}\n{}", THEME_CSS, DEMO_CSS)
    }

    /// Runtime script: navigation, demo toggles and copy buttons.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const THEME_CSS: &str = r#":root {
  --sidebar-width: 260px;
  --toc-width: 200px;
  --content-max-width: 860px;
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #f6f8fa;
  --muted-foreground: #59636e;
  --border: #d1d9e0;
  --primary: #0969da;
  --primary-foreground: #ffffff;
  --radius: 6px;
}

@media (prefers-color-scheme: dark) {
  :root {
    --background: #0d1117;
    --foreground: #e6edf3;
    --muted: #161b22;
    --muted-foreground: #9198a1;
    --border: #3d444d;
    --primary: #4493f8;
  }
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

.menu-btn {
  display: none;
}

.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-header {
  margin-bottom: 1.5rem;
}

.nav-logo {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.nav-list,
.nav-children {
  list-style: none;
}

.nav-children {
  margin-left: 1rem;
}

.nav-item a {
  display: block;
  padding: 0.375rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
}

.nav-item.active > a {
  background: var(--primary);
  color: var(--primary-foreground);
}

.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
}

.doc {
  max-width: var(--content-max-width);
  min-width: 0;
}

.content h1 {
  font-size: 2.25rem;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.content p {
  margin-bottom: 1rem;
}

.content pre {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
  margin-bottom: 1rem;
}

.toc {
  position: sticky;
  top: 2rem;
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  text-transform: uppercase;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  color: var(--muted-foreground);
  text-decoration: none;
  font-size: 0.875rem;
}

.toc-level-3 {
  padding-left: 0.75rem;
}

@media (max-width: 900px) {
  .layout,
  .main {
    grid-template-columns: 1fr;
  }

  .toc {
    display: none;
  }

  .menu-btn {
    display: block;
    position: fixed;
    top: 0.75rem;
    right: 0.75rem;
    z-index: 10;
  }

  .sidebar {
    display: none;
  }

  .sidebar.open {
    display: block;
  }
}
"#;

const DEMO_CSS: &str = r#".dpdb {
  border: 1px solid var(--border);
  border-radius: var(--radius);
  margin-bottom: 1.5rem;
  overflow: hidden;
}

.dpdb__container {
  display: flex;
}

.dpdb__container-row {
  flex-direction: row;
}

.dpdb__container-row-reverse {
  flex-direction: row-reverse;
}

.dpdb__container-column {
  flex-direction: column;
}

.dpdb__container-column-reverse {
  flex-direction: column-reverse;
}

.dpdb__display-row > * {
  flex: 1 1 0;
  min-width: 0;
}

.dpdb__playground-wrapper {
  border-right: 1px solid var(--border);
}

.dpdb__display-column .dpdb__playground-wrapper {
  border-right: none;
  border-bottom: 1px solid var(--border);
}

.dpdb__hidden {
  display: none;
}

.content .dpdb__code,
.dpdb__editor {
  margin: 0;
  border: none;
  border-radius: 0;
  width: 100%;
  min-height: 12rem;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
}

.dpdb__editor {
  display: block;
  resize: vertical;
  padding: 1rem;
  background: var(--muted);
  color: var(--foreground);
  tab-size: 2;
}

.dpdb__runner {
  display: block;
  width: 100%;
  min-height: 12rem;
  border: none;
  background: #ffffff;
}

.dpdb__control-bar {
  display: flex;
  justify-content: flex-end;
  gap: 0.5rem;
  padding: 0.375rem 0.75rem;
  background: var(--muted);
  border-top: 1px solid var(--border);
}

.dpdb__display-column .dpdb__control-bar {
  border-top: none;
  border-bottom: 1px solid var(--border);
}

.dpdb__control-bar button {
  padding: 0.125rem 0.625rem;
  font-size: 0.75rem;
  background: none;
  color: var(--muted-foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

.dpdb--invalid {
  padding: 1rem;
}
"#;

const DEFAULT_JS: &str = r#"(function() {
  'use strict';

  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  const currentPath = window.location.pathname;
  document.querySelectorAll('.nav-item a').forEach(link => {
    if (link.getAttribute('href') === currentPath) {
      link.parentElement.classList.add('active');
    }
  });

  function demoCode(demo) {
    const editor = demo.querySelector('.dpdb__editor');
    if (editor) return editor.value;
    const code = demo.querySelector('.dpdb__code');
    return code ? code.textContent : '';
  }

  document.addEventListener('click', async (event) => {
    const button = event.target.closest('.dpdb__toggle, .dpdb__copy');
    if (!button) return;
    const demo = document.getElementById(button.dataset.demo);
    if (!demo) return;

    if (button.classList.contains('dpdb__toggle')) {
      const panel = demo.querySelector('.dpdb__playground-wrapper');
      if (!panel) return;
      const hidden = panel.classList.toggle('dpdb__hidden');
      button.textContent = hidden ? 'Show code' : 'Hide code';
      button.setAttribute('aria-expanded', String(!hidden));
      return;
    }

    try {
      await navigator.clipboard.writeText(demoCode(demo));
      button.textContent = 'Copied!';
    } catch (err) {
      button.textContent = 'Error';
    }
    setTimeout(() => { button.textContent = 'Copy'; }, 2000);
  });
})();
"#;
