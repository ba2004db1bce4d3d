//! Test fixtures for site API responses
//!
//! Realistic classic pages and site structures in the wire format of the
//! site REST API.

#![allow(dead_code)]

use serde_json::json;

pub const SOURCE_SITE: &str = "https://contoso.example/sites/classic";
pub const TARGET_SITE: &str = "https://contoso.example/sites/modern";

// Wiki home page: two wiki columns, one embedding a query web part
pub fn wiki_home_page() -> serde_json::Value {
  json!({
    "title": "Home",
    "kind": "wiki",
    "layout": "WikiTwoColumns",
    "isHomePage": true,
    "sections": [
      {
        "columns": [
          {
            "width": 8,
            "wikiHtml": "<h1>Welcome</h1><p>Start with the <a href=\"https://contoso.example/sites/classic/SitePages/Guide.aspx\">guide</a>.</p><div data-webpart-id=\"wp-news\"></div>",
            "webParts": [
              {
                "id": "wp-news",
                "type": "ContentByQueryWebPart",
                "title": "Latest news",
                "properties": { "ItemLimit": 5 }
              }
            ]
          },
          {
            "width": 4,
            "wikiHtml": "<p>Sidebar</p><img src=\"https://contoso.example/sites/classic/SiteAssets/logo.png\" alt=\"Logo\"/>",
            "webParts": []
          }
        ]
      }
    ],
    "author": { "login": "i:0#.w|contoso\\jane", "display_name": "Jane Doe" },
    "editor": { "login": "i:0#.w|contoso\\john" },
    "created": "2019-03-01T08:00:00Z",
    "modified": "2021-06-15T12:30:00Z"
  })
}

// Web-part page with a title bar, a hidden web part and an unknown vendor part
pub fn team_news_page() -> serde_json::Value {
  json!({
    "title": "Team News",
    "kind": "webpart",
    "layout": "WebPartPage",
    "sections": [
      {
        "columns": [
          {
            "width": 12,
            "webParts": [
              {
                "id": "wp-title",
                "type": "TitleBarWebPart",
                "title": "Team News",
                "properties": { "HeaderTitle": "Team News" }
              },
              {
                "id": "wp-intro",
                "type": "ContentEditorWebPart",
                "title": "Intro",
                "properties": { "Content": "<p>Hello team</p>" }
              }
            ]
          }
        ]
      },
      {
        "columns": [
          {
            "width": 6,
            "webParts": [
              {
                "id": "wp-notes",
                "type": "ContentEditorWebPart",
                "title": "Editor notes",
                "hidden": true,
                "properties": { "Content": "<p>Do not publish</p>" }
              }
            ]
          },
          { "width": 6, "webParts": [] }
        ]
      },
      {
        "columns": [
          {
            "width": 6,
            "webParts": [
              {
                "id": "wp-map",
                "type": "PageViewerWebPart",
                "title": "Office map",
                "properties": { "ContentLink": "https://contoso.example/sites/classic/SiteAssets/map.html" }
              }
            ]
          },
          {
            "width": 6,
            "webParts": [
              {
                "id": "wp-weather",
                "type": "Vendor.Weather.WeatherWebPart, Vendor.Weather, Version=1.0.0.0",
                "title": "Weather"
              }
            ]
          }
        ]
      }
    ],
    "author": { "login": "i:0#.w|contoso\\jane", "display_name": "Jane Doe" },
    "created": "2020-01-10T09:00:00Z",
    "modified": "2020-02-11T10:00:00Z",
    "fields": { "Department": "Sales" },
    "permissions": [
      { "principal": "i:0#.w|contoso\\jane", "role": "Full Control" },
      { "principal": "c:0+.w|contoso\\sales", "role": "Read" }
    ]
  })
}

// Minimal wiki page with a single paragraph
pub fn simple_page(title: &str) -> serde_json::Value {
  json!({
    "title": title,
    "kind": "wiki",
    "layout": "WikiOneColumn",
    "sections": [
      {
        "columns": [
          { "width": 12, "wikiHtml": format!("<p>{title}</p>"), "webParts": [] }
        ]
      }
    ]
  })
}

// Modern page that already exists on the target site
pub fn existing_modern_page() -> serde_json::Value {
  json!({
    "title": "Already migrated",
    "layout": "Article",
    "sections": [
      {
        "columns": [
          {
            "width": 12,
            "webParts": [
              { "id": "1", "type": "Text", "properties": { "text": "<p>Old copy</p>" } }
            ]
          }
        ]
      }
    ]
  })
}

// Site structure with one branding file
pub fn site_structure() -> serde_json::Value {
  json!({
    "title": "Classic Intranet",
    "lists": [
      {
        "title": "Documents",
        "template": 101,
        "url": "Shared Documents",
        "contentTypeIds": ["0x0101"]
      },
      {
        "title": "Announcements",
        "template": 104,
        "url": "Lists/Announcements",
        "contentTypeIds": ["0x0104", "0x0100ABCD"]
      }
    ],
    "contentTypes": [
      {
        "id": "0x0100ABCD",
        "name": "Team Announcement",
        "group": "Contoso",
        "fields": ["Title", "Body", "Expires"]
      }
    ],
    "files": [
      { "path": "_catalogs/masterpage/contoso.css", "branding": true },
      { "path": "SiteAssets/readme.txt", "branding": false }
    ]
  })
}

// Site structure containing a list without a title
pub fn broken_site_structure() -> serde_json::Value {
  json!({
    "title": "Broken",
    "lists": [
      { "title": "Documents", "template": 101, "url": "Shared Documents" },
      { "title": "  ", "template": 100, "url": "Lists/Untitled" }
    ]
  })
}
