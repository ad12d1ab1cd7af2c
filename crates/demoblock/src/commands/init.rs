//! Initialize documentation in a project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing demoblock...");

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let written = scaffold(root, config_path, yes)?;
    if written.is_empty() {
        tracing::warn!("Nothing written. Use --yes to overwrite existing files.");
        return Ok(());
    }

    for path in &written {
        tracing::info!("Created {}", path.display());
    }
    tracing::info!("Run 'demoblock dev' to start the development server.");

    Ok(())
}

/// Write the starter config and pages. Existing files are kept unless
/// `overwrite` is set. Returns the files written.
fn scaffold(root: &Path, config_path: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (docs_dir.join("index.md"), DEFAULT_INDEX),
        (docs_dir.join("vanilla.md"), VANILLA_PAGE),
        (docs_dir.join("vue.md"), VUE_PAGE),
        (docs_dir.join("react.md"), REACT_PAGE),
    ];

    let mut written = Vec::new();
    for (path, content) in files {
        if path.exists() && !overwrite {
            tracing::debug!("Keeping existing {}", path.display());
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"# demoblock configuration

[docs]
# Source directory for documentation
dir = "docs"

# Output directory for built site
output = "dist"

# Site title
title = "My Demos"

# Base URL (for deployment)
base_url = "/"

[build]
minify = true

[demo]
# Defaults for every demo; a fence directive overrides them.
# layout = "row"            # row | row-reverse | column | column-reverse
# live = true
# showCode = true
# showCodeByDefault = false
# transpile = true
# target = "es2015"

# [demo.scope]
# dayjs = "https://unpkg.com/dayjs/dayjs.min.js"

[server]
port = 7777
# debounce_ms = 300
"#;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
order: 1
---

# Welcome

Every fenced block whose info string names a demo kind becomes a live demo:

````md
```html vanilla layout=column&showCodeByDefault=true
<template>...</template>
```
````

The kind is `vanilla`, `vue` or `react`. Options follow as `key=value`
pairs joined by `&`. Values are literals: `true`, `false`, numbers, quoted
strings, or a layout name.

- [Vanilla](/vanilla/)
- [Vue](/vue/)
- [React](/react/)
"#;

const VANILLA_PAGE: &str = r#"---
title: Vanilla
order: 2
---

# Vanilla

Markup goes in `<template>`, styles in `<style>`, code in `<script>`.

```html vanilla
<template>
  <button id="counter">Clicked 0 times</button>
</template>

<script>
let count = 0;
const button = document.getElementById('counter');
button.addEventListener('click', () => {
  count += 1;
  button.textContent = `Clicked ${count} times`;
});
</script>

<style>
button { padding: 0.5rem 1rem; }
</style>
```
"#;

const VUE_PAGE: &str = r#"---
title: Vue
order: 3
---

# Vue

The default export is mounted on the template.

```html vue layout=column
<template>
  <button @click="count++">Clicked {{ count }} times</button>
</template>

<script>
export default {
  data() {
    return { count: 0 };
  },
};
</script>

<style>
button { padding: 0.5rem 1rem; }
</style>
```
"#;

const REACT_PAGE: &str = r#"---
title: React
order: 4
---

# React

The whole block is the script. `CONTAINER` is the element to render into.

```jsx react showCodeByDefault=true
function Counter() {
  const [count, setCount] = React.useState(0);
  return <button onClick={() => setCount(count + 1)}>Clicked {count} times</button>;
}

ReactDOM.createRoot(CONTAINER).render(<Counter />);
```
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use demoblock_static::StaticBuilder;
    use tempfile::tempdir;

    #[test]
    fn keeps_existing_files() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("docs.toml");
        fs::write(&config, "# mine\n").unwrap();

        let written = scaffold(temp.path(), &config, false).unwrap();

        assert_eq!(written.len(), 4);
        assert_eq!(fs::read_to_string(&config).unwrap(), "# mine\n");

        let rewritten = scaffold(temp.path(), &config, true).unwrap();
        assert_eq!(rewritten.len(), 5);
    }

    #[tokio::test]
    async fn starter_site_builds_cleanly() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("docs.toml");
        scaffold(temp.path(), &config_path, false).unwrap();

        let mut config = ConfigFile::load(&config_path).unwrap().build_config();
        config.docs_dir = temp.path().join("docs");
        config.output_dir = temp.path().join("dist");

        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.pages, 4);
        assert_eq!(result.demos, 3);
        assert_eq!(result.failed_demos, 0);
    }
}
