//! Built-in classic-to-modern mapping table.
//!
//! Covers the common classic web parts only; anything else falls back to the
//! unmapped policy or to a mapping file.

use super::{MappingRuleSet, PropertyRule, PropertyTransformer, UnmappedPolicy, WebPartMapping};

/// Source web-part type of classic title bars.
pub const TITLE_BAR_WEB_PART: &str = "TitleBarWebPart";

fn rename(from: &str, to: &str) -> PropertyRule {
  PropertyRule::Rename {
    from: from.to_string(),
    to: to.to_string(),
  }
}

fn rules(rules: Vec<PropertyRule>) -> PropertyTransformer {
  PropertyTransformer::Rules(rules)
}

pub(super) fn default_rule_set() -> MappingRuleSet {
  let mut set = MappingRuleSet::empty();
  set.set_unmapped_policy(UnmappedPolicy::Placeholder);

  set.add_web_part_mapping(
    "ContentEditorWebPart",
    WebPartMapping::new(
      "Text",
      rules(vec![
        rename("Content", "text"),
        PropertyRule::RewriteLinks { name: "text".into() },
      ]),
    ),
  );
  set.add_web_part_mapping(
    "WikiText",
    WebPartMapping::new(
      "Text",
      rules(vec![
        rename("Text", "text"),
        PropertyRule::RewriteLinks { name: "text".into() },
      ]),
    ),
  );

  set.add_web_part_mapping(
    "ImageWebPart",
    WebPartMapping::new(
      "Image",
      rules(vec![
        rename("ImageLink", "imageSource"),
        rename("ImageUrl", "imageSource"),
        rename("AlternativeText", "altText"),
        PropertyRule::RewriteUrl {
          name: "imageSource".into(),
        },
      ]),
    ),
  );
  set.add_web_part_mapping(
    "WikiImage",
    WebPartMapping::new(
      "Image",
      rules(vec![
        rename("ImageUrl", "imageSource"),
        rename("AlternativeText", "altText"),
        PropertyRule::RewriteUrl {
          name: "imageSource".into(),
        },
      ]),
    ),
  );
  set.add_web_part_mapping(
    "WikiVideo",
    WebPartMapping::new(
      "VideoEmbed",
      rules(vec![
        rename("VideoUrl", "videoSource"),
        PropertyRule::RewriteUrl {
          name: "videoSource".into(),
        },
      ]),
    ),
  );

  let list = || {
    rules(vec![
      rename("ListUrl", "listUrl"),
      rename("ViewId", "selectedViewId"),
      PropertyRule::RewriteUrl { name: "listUrl".into() },
    ])
  };
  set.add_web_part_mapping("XsltListViewWebPart", WebPartMapping::new("List", list()));
  set.add_web_part_mapping("ListViewWebPart", WebPartMapping::new("List", list()));

  set.add_web_part_mapping(
    "PageViewerWebPart",
    WebPartMapping::new(
      "Embed",
      rules(vec![
        rename("ContentLink", "embedUrl"),
        PropertyRule::RewriteUrl { name: "embedUrl".into() },
      ]),
    ),
  );
  set.add_web_part_mapping(
    "ScriptEditorWebPart",
    WebPartMapping::new("ScriptEditor", rules(vec![rename("Content", "script")])),
  );
  set.add_web_part_mapping(
    "SummaryLinkWebPart",
    WebPartMapping::new(
      "QuickLinks",
      rules(vec![
        rename("SummaryLinkStore", "items"),
        PropertyRule::RewriteLinks { name: "items".into() },
      ]),
    ),
  );
  set.add_web_part_mapping(
    "ContentByQueryWebPart",
    WebPartMapping::new(
      "HighlightedContent",
      rules(vec![rename("ItemLimit", "maxItemsPerPage")]),
    ),
  );
  set.add_web_part_mapping(
    "ContactFieldWebPart",
    WebPartMapping::new(
      "People",
      rules(vec![
        rename("ContactLoginName", "persons"),
        PropertyRule::MapUser { name: "persons".into() },
      ]),
    ),
  );
  set.add_web_part_mapping(
    TITLE_BAR_WEB_PART,
    WebPartMapping::new("PageTitle", rules(vec![rename("HeaderTitle", "title")])),
  );

  for layout in [
    "WikiOneColumn",
    "WikiOneColumnSideBar",
    "WikiTwoColumns",
    "WikiTwoColumnsHeader",
    "WikiTwoColumnsHeaderFooter",
    "WikiThreeColumns",
    "WikiThreeColumnsHeader",
    "WikiThreeColumnsHeaderFooter",
    "WebPartPage",
    "ArticleLeft",
    "ArticleRight",
    "ArticleLinks",
    "BlankWebPartPage",
  ] {
    set.add_layout_mapping(layout, "Article");
  }
  set.add_layout_mapping("WelcomeSplash", "Home");
  set.add_layout_mapping("WelcomeLinks", "Home");

  set
}
