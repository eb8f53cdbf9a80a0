// Built-in templates used when the theme does not provide its own.

pub const PAGE_TEMPLATE_NAME: &str = "page.html.liquid";
pub const SINGLE_TEMPLATE_NAME: &str = "single.html.liquid";

pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page_title | escape }}</title>
  <link rel="stylesheet" href="/css/style.css">
</head>
<body>
  <nav class="breadcrumbs">
    {% for crumb in breadcrumbs %}<a href="{{ crumb.url }}">{{ crumb.title | escape }}</a>{% unless forloop.last %} / {% endunless %}{% endfor %}
  </nav>
  <h1>{{ folder.title | escape }}</h1>
  {% if folder.description_html != "" %}<div class="description">{{ folder.description_html }}</div>{% endif %}
  {% if siblings.size > 1 %}
  <ul class="siblings">
    {% for link in siblings %}<li{% if link.current %} class="current"{% endif %}><a href="{{ link.url }}">{{ link.title | escape }}</a></li>{% endfor %}
  </ul>
  {% endif %}
  {% if children.size > 0 %}
  <ul class="folders">
    {% for link in children %}<li><a href="{{ link.url }}">{% if link.cover_url %}<img src="{{ link.cover_url }}" alt="">{% endif %}{{ link.title | escape }}</a></li>{% endfor %}
  </ul>
  {% endif %}
  <ul class="images">
    {% for image in images %}<li><a href="{{ image.url }}"><img src="{{ image.thumbnail_url }}" alt="{{ image.title | escape }}" loading="lazy"></a></li>{% endfor %}
  </ul>
  <footer>{{ site.name | escape }}</footer>
</body>
</html>
"#;

pub const SINGLE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page_title | escape }}</title>
  <link rel="stylesheet" href="/css/style.css">
</head>
<body>
  <nav class="breadcrumbs">
    {% for crumb in breadcrumbs %}<a href="{{ crumb.url }}">{{ crumb.title | escape }}</a> / {% endfor %}{{ image.title | escape }}
  </nav>
  <nav class="pager">
    {% if navigation.first %}<a href="{{ navigation.first.url }}">First</a>{% endif %}
    {% if navigation.previous %}<a href="{{ navigation.previous.url }}">Previous</a>{% endif %}
    {% if navigation.next %}<a href="{{ navigation.next.url }}">Next</a>{% endif %}
    {% if navigation.last %}<a href="{{ navigation.last.url }}">Last</a>{% endif %}
  </nav>
  <h1>{{ image.title | escape }}</h1>
  <a href="{{ image.raw_url }}"><img src="{{ image.raw_url }}" alt="{{ image.title | escape }}"></a>
  {% if image.description_html != "" %}<div class="description">{{ image.description_html }}</div>{% endif %}
  <footer>{{ site.name | escape }}</footer>
</body>
</html>
"#;

pub const STYLE_CSS: &str = "body { font-family: sans-serif; margin: 2em; }\n\
.images, .folders, .siblings { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 1em; }\n\
.current { font-weight: bold; }\n";

pub const NOT_FOUND_HTML: &str = "<!DOCTYPE html>\n<html><body><h1>Not found</h1></body></html>\n";

pub const SERVER_ERROR_HTML: &str =
    "<!DOCTYPE html>\n<html><body><h1>Something went wrong</h1></body></html>\n";

/// Built-in template by file name.
pub fn template(name: &str) -> Option<&'static str> {
    match name {
        PAGE_TEMPLATE_NAME => Some(PAGE_TEMPLATE),
        SINGLE_TEMPLATE_NAME => Some(SINGLE_TEMPLATE),
        _ => None,
    }
}
