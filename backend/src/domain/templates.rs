//! Popup ad templates.
//!
//! Pure string rendering: intake brief + generated copy + brand constants in,
//! three independent blobs out (markup, styles, behaviour script). The
//! `aisim-popup-*` selector prefix namespaces everything injected into host
//! pages. [`embed_document`] is the single source for the standalone document
//! served by both the embed and download endpoints.

use super::ad::Ad;
use super::ad_copy::AdCopy;
use super::brand::{AISIM, Brand};
use super::intake::IntakeForm;
use super::popup::SHOWN_STORAGE_KEY;

/// Escape text interpolated into HTML content or attribute positions.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text interpolated into a single-quoted JavaScript string literal.
fn escape_js(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace("</", "<\\/")
}

/// Render the popup markup. The logo block is emitted only when the brief
/// supplies a logo URL.
pub fn render_html(form: &IntakeForm, copy: &AdCopy) -> String {
    let logo = form
        .brand_logo
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .map(|url| {
            format!(
                "      <img src=\"{src}\" alt=\"{alt}\" class=\"aisim-popup-logo\">\n",
                src = escape_html(url),
                alt = escape_html(&form.business_name),
            )
        })
        .unwrap_or_default();

    let bullets: String = copy
        .bullets
        .iter()
        .map(|bullet| format!("        <li>{}</li>\n", escape_html(bullet)))
        .collect();

    format!(
        r#"<div id="aisim-popup-overlay" class="aisim-popup-overlay">
  <div class="aisim-popup-container">
    <button class="aisim-popup-close">&times;</button>

    <div class="aisim-popup-header">
{logo}      <h1 class="aisim-popup-headline">{headline}</h1>
    </div>

    <div class="aisim-popup-body">
      <p class="aisim-popup-subheadline">{subheadline}</p>

      <ul class="aisim-popup-benefits">
{bullets}      </ul>

      <div class="aisim-popup-trust">
        <span class="aisim-trust-icon">&#10003;</span>
        <span>{trust}</span>
      </div>
    </div>

    <div class="aisim-popup-footer">
      <a href="{cta_link}" class="aisim-popup-cta" id="aisim-cta-btn">{cta_text}</a>
      <p class="aisim-popup-privacy">Your privacy is protected. No spam, ever.</p>
    </div>
  </div>
</div>
"#,
        headline = escape_html(&copy.headline),
        subheadline = escape_html(&copy.subheadline),
        trust = escape_html(&copy.trust_element),
        cta_link = escape_html(&form.cta_link),
        cta_text = escape_html(&copy.cta_text),
    )
}

/// Render the brand-coloured stylesheet for the fixed selector set.
pub fn render_css(brand: &Brand) -> String {
    format!(
        r#".aisim-popup-overlay {{
  position: fixed;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  background: rgba(0, 0, 0, 0.75);
  display: flex;
  align-items: center;
  justify-content: center;
  z-index: 999999;
  opacity: 0;
  visibility: hidden;
  transition: all 0.3s ease;
  font-family: {font_family};
}}

.aisim-popup-overlay.active {{
  opacity: 1;
  visibility: visible;
}}

.aisim-popup-container {{
  background: {surface};
  border-radius: {radius_xl};
  max-width: 500px;
  width: 90%;
  padding: {spacing_xxl};
  position: relative;
  box-shadow: 0 25px 50px rgba(0, 0, 0, 0.5);
  border: 1px solid {border};
  animation: aisim-slide-up 0.4s ease-out;
}}

@keyframes aisim-slide-up {{
  from {{
    transform: translateY(50px);
    opacity: 0;
  }}
  to {{
    transform: translateY(0);
    opacity: 1;
  }}
}}

.aisim-popup-close {{
  position: absolute;
  top: {spacing_md};
  right: {spacing_md};
  background: none;
  border: none;
  font-size: 2rem;
  color: {text_secondary};
  cursor: pointer;
  transition: color 0.2s;
}}

.aisim-popup-close:hover {{
  color: {text};
}}

.aisim-popup-header {{
  text-align: center;
  margin-bottom: {spacing_xl};
}}

.aisim-popup-logo {{
  max-width: 120px;
  height: auto;
  margin-bottom: {spacing_md};
}}

.aisim-popup-headline {{
  font-size: 2rem;
  font-weight: {weight_bold};
  color: {text};
  margin: 0;
  background: {gradient};
  -webkit-background-clip: text;
  -webkit-text-fill-color: transparent;
}}

.aisim-popup-body {{
  margin-bottom: {spacing_xl};
}}

.aisim-popup-subheadline {{
  font-size: 1.125rem;
  color: {text_secondary};
  text-align: center;
  margin-bottom: {spacing_lg};
  line-height: 1.6;
}}

.aisim-popup-benefits {{
  list-style: none;
  padding: 0;
  margin: 0 0 {spacing_lg} 0;
}}

.aisim-popup-benefits li {{
  padding: {spacing_sm} 0 {spacing_sm} {spacing_xl};
  position: relative;
  color: {text_secondary};
  line-height: 1.6;
}}

.aisim-popup-benefits li:before {{
  content: "\2713";
  position: absolute;
  left: 0;
  color: {primary};
  font-weight: {weight_bold};
  font-size: 1.2rem;
}}

.aisim-popup-trust {{
  display: flex;
  align-items: center;
  justify-content: center;
  gap: {spacing_sm};
  padding: {spacing_md};
  background: rgba(16, 185, 129, 0.1);
  border-radius: {radius_md};
  color: {text_secondary};
  font-size: 0.9rem;
}}

.aisim-trust-icon {{
  color: {primary};
  font-weight: {weight_bold};
  font-size: 1.2rem;
}}

.aisim-popup-footer {{
  text-align: center;
}}

.aisim-popup-cta {{
  display: inline-block;
  background: {button_background};
  color: {text};
  padding: {button_padding};
  border-radius: {button_radius};
  font-weight: {weight_semibold};
  text-decoration: none;
  transition: all 0.3s ease;
  font-size: 1.125rem;
  width: 100%;
  max-width: 300px;
  box-shadow: 0 4px 6px rgba(16, 185, 129, 0.2);
}}

.aisim-popup-cta:hover {{
  transform: translateY(-2px);
  box-shadow: 0 6px 12px rgba(16, 185, 129, 0.3);
}}

.aisim-popup-privacy {{
  margin-top: {spacing_md};
  font-size: 0.8rem;
  color: {text_secondary};
  opacity: 0.7;
}}

@media (max-width: 768px) {{
  .aisim-popup-container {{
    padding: {spacing_xl};
  }}

  .aisim-popup-headline {{
    font-size: 1.5rem;
  }}

  .aisim-popup-subheadline {{
    font-size: 1rem;
  }}
}}
"#,
        font_family = brand.font_family,
        surface = brand.colors.surface,
        border = brand.colors.border,
        gradient = brand.colors.gradient,
        primary = brand.colors.primary,
        text = brand.colors.text,
        text_secondary = brand.colors.text_secondary,
        weight_bold = brand.font_weight_bold,
        weight_semibold = brand.font_weight_semibold,
        button_background = brand.button_background,
        button_padding = brand.button_padding,
        button_radius = brand.button_radius,
        radius_md = brand.radius.md,
        radius_xl = brand.radius.xl,
        spacing_sm = brand.spacing.sm,
        spacing_md = brand.spacing.md,
        spacing_lg = brand.spacing.lg,
        spacing_xl = brand.spacing.xl,
        spacing_xxl = brand.spacing.xxl,
    )
}

/// Render the self-contained behaviour script.
///
/// The IIFE mirrors the server-side popup machine: trigger policy, frequency
/// policy over local/session storage, the three close handlers, and a
/// fire-and-forget analytics POST on display. The scroll trigger guards the
/// zero-scrollable-distance case so short pages simply never fire.
pub fn render_js(form: &IntakeForm, ad_id: &str, track_endpoint: &str) -> String {
    format!(
        r#"(function() {{
  'use strict';

  var config = {{
    trigger: '{trigger}',
    frequency: '{frequency}',
    delayMs: 2000,
    scrollThreshold: 50,
    storageKey: '{storage_key}'
  }};

  var adId = '{ad_id}';
  var trackEndpoint = '{track_endpoint}';

  // States: 'not-shown' -> 'shown' -> 'dismissed'.
  var state = 'not-shown';

  function shouldShow() {{
    var lastShown = localStorage.getItem(config.storageKey);
    if (state !== 'not-shown') {{
      return false;
    }}
    switch (config.frequency) {{
      case 'once':
        return !lastShown;
      case 'daily':
        return !lastShown || Date.now() - parseInt(lastShown, 10) > 24 * 60 * 60 * 1000;
      case 'session':
        return !sessionStorage.getItem(config.storageKey);
      default:
        return true;
    }}
  }}

  function show() {{
    if (!shouldShow()) {{
      return;
    }}
    var overlay = document.querySelector('.aisim-popup-overlay');
    if (!overlay) {{
      return;
    }}
    overlay.classList.add('active');
    state = 'shown';
    localStorage.setItem(config.storageKey, Date.now().toString());
    sessionStorage.setItem(config.storageKey, 'true');
    trackImpression();
  }}

  function dismiss() {{
    if (state !== 'shown') {{
      return;
    }}
    var overlay = document.querySelector('.aisim-popup-overlay');
    if (overlay) {{
      overlay.classList.remove('active');
    }}
    state = 'dismissed';
  }}

  function setupTrigger() {{
    switch (config.trigger) {{
      case 'immediate':
        show();
        break;
      case 'time-delay':
        setTimeout(show, config.delayMs);
        break;
      case 'scroll':
        window.addEventListener('scroll', function onScroll() {{
          var scrollable = document.documentElement.scrollHeight - window.innerHeight;
          if (scrollable <= 0) {{
            return; // content fits the viewport: never fires
          }}
          if ((window.scrollY / scrollable) * 100 >= config.scrollThreshold) {{
            window.removeEventListener('scroll', onScroll);
            show();
          }}
        }});
        break;
      case 'exit-intent':
        document.addEventListener('mouseleave', function (e) {{
          if (e.clientY <= 0) {{
            show();
          }}
        }});
        break;
    }}
  }}

  function setupCloseHandlers() {{
    var closeBtn = document.querySelector('.aisim-popup-close');
    if (closeBtn) {{
      closeBtn.addEventListener('click', dismiss);
    }}
    var overlay = document.querySelector('.aisim-popup-overlay');
    if (overlay) {{
      overlay.addEventListener('click', function (e) {{
        if (e.target === overlay) {{
          dismiss();
        }}
      }});
    }}
    document.addEventListener('keydown', function (e) {{
      if (e.key === 'Escape') {{
        dismiss();
      }}
    }});
  }}

  function trackImpression() {{
    fetch(trackEndpoint, {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify({{
        adId: adId,
        url: window.location.href,
        referrer: document.referrer
      }})
    }}).catch(function () {{
      // Fire and forget: analytics must never break the host page.
    }});
  }}

  function init() {{
    setupTrigger();
    setupCloseHandlers();
  }}

  if (document.readyState === 'loading') {{
    document.addEventListener('DOMContentLoaded', init);
  }} else {{
    init();
  }}
}})();
"#,
        trigger = form.display_trigger.as_str(),
        frequency = form.display_frequency.as_str(),
        storage_key = SHOWN_STORAGE_KEY,
        ad_id = escape_js(ad_id),
        track_endpoint = escape_js(track_endpoint),
    )
}

/// Standalone HTML document wrapping an ad's three blobs.
///
/// The embed endpoint and the download endpoint must both serve exactly this
/// output for a stored ad.
pub fn embed_document(ad: &Ad) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{brand} Ad - {ad_id}</title>
    <style>{css}</style>
</head>
<body>
    {html}
    <script>{js}</script>
</body>
</html>
"#,
        brand = AISIM.name,
        ad_id = escape_html(&ad.id),
        css = ad.css,
        html = ad.html,
        js = ad.javascript,
    )
}

/// Iframe embed snippet pointing at the hosted embed endpoint.
pub fn iframe_snippet(ad_id: &str, public_base_url: &str) -> String {
    format!(
        r#"<iframe
  src="{base}/api/embed/{ad_id}"
  width="100%"
  height="600"
  frameborder="0"
  style="border: none; border-radius: 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.1);">
</iframe>
"#,
        base = public_base_url.trim_end_matches('/'),
        ad_id = escape_html(ad_id),
    )
}

/// Script-tag snippet that injects the ad into the host page at load time.
pub fn script_snippet(ad: &Ad) -> String {
    format!(
        r#"<script>
  (function() {{
    var css = document.createElement('style');
    css.textContent = {css};
    document.head.appendChild(css);

    var container = document.createElement('div');
    container.innerHTML = {html};
    document.body.appendChild(container);

    {js}
  }})();
</script>
"#,
        css = serde_json::to_string(&ad.css).unwrap_or_default(),
        html = serde_json::to_string(&ad.html).unwrap_or_default(),
        js = ad.javascript,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ad::AdMetadata;
    use chrono::Utc;

    fn form() -> IntakeForm {
        serde_json::from_value(serde_json::json!({
            "businessName": "Acme",
            "businessWebsite": "https://acme.com",
            "industry": "tech",
            "adGoal": "leads",
            "targetAudience": "devs",
            "keyMessage": "fast",
            "callToAction": "Buy",
            "ctaLink": "https://acme.com/buy",
        }))
        .expect("form deserializes")
    }

    fn ad() -> Ad {
        let form = form();
        let copy = AdCopy::fallback();
        Ad {
            id: "ad_test".into(),
            payment_intent_id: None,
            html: render_html(&form, &copy),
            css: render_css(&AISIM),
            javascript: render_js(&form, "ad_test", "/api/ads/ad_test/track/impression"),
            preview: String::new(),
            metadata: AdMetadata {
                package: "preview".into(),
                brand_compliant: true,
                estimated_ctr: 2.5,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn html_interpolates_copy_and_escapes_it() {
        let mut copy = AdCopy::fallback();
        copy.headline = "Fast <b>& furious</b>".into();
        let html = render_html(&form(), &copy);
        assert!(html.contains("Fast &lt;b&gt;&amp; furious&lt;/b&gt;"));
        assert!(html.contains("aisim-popup-overlay"));
        assert!(html.contains("https://acme.com/buy"));
    }

    #[test]
    fn logo_block_is_conditional() {
        let copy = AdCopy::fallback();
        let without = render_html(&form(), &copy);
        assert!(!without.contains("aisim-popup-logo"));

        let mut with_logo = form();
        with_logo.brand_logo = Some("https://acme.com/logo.png".into());
        let with = render_html(&with_logo, &copy);
        assert!(with.contains("aisim-popup-logo"));
        assert!(with.contains("https://acme.com/logo.png"));
    }

    #[test]
    fn css_carries_brand_palette_and_prefix() {
        let css = render_css(&AISIM);
        assert!(css.contains(AISIM.colors.primary));
        assert!(css.contains(AISIM.colors.surface));
        assert!(css.starts_with(".aisim-popup-overlay"));
    }

    #[test]
    fn js_embeds_config_and_endpoint() {
        let mut custom = form();
        custom.display_trigger = crate::domain::intake::DisplayTrigger::Scroll;
        custom.display_frequency = crate::domain::intake::DisplayFrequency::Once;
        let js = render_js(&custom, "ad_9", "/api/ads/ad_9/track/impression");
        assert!(js.contains("trigger: 'scroll'"));
        assert!(js.contains("frequency: 'once'"));
        assert!(js.contains("/api/ads/ad_9/track/impression"));
        assert!(js.contains("scrollable <= 0"));
    }

    #[test]
    fn embed_document_wraps_all_three_blobs() {
        let ad = ad();
        let doc = embed_document(&ad);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(&ad.css));
        assert!(doc.contains(&ad.html));
        assert!(doc.contains(&ad.javascript));
    }

    #[test]
    fn embed_document_is_deterministic_for_a_stored_ad() {
        let ad = ad();
        assert_eq!(embed_document(&ad), embed_document(&ad));
    }

    #[test]
    fn iframe_snippet_normalises_trailing_slash() {
        let snippet = iframe_snippet("ad_1", "https://ads.example.com/");
        assert!(snippet.contains("https://ads.example.com/api/embed/ad_1"));
    }

    #[test]
    fn script_snippet_json_encodes_markup() {
        let ad = ad();
        let snippet = script_snippet(&ad);
        // Markup is injected as a JSON string literal, not raw HTML.
        assert!(snippet.contains("container.innerHTML = \""));
    }
}
