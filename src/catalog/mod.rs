//! Static catalog of the tracked JPX-listed MSCI ETF universe
//!
//! Pure lookup data: ticker → tracked index name, fund name and category.
//! Display names attach to computed rows at the very end of the pipeline;
//! everything upstream is keyed by ticker alone. The universe is fixed for
//! a session and never computed.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Coarse grouping used by the category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// 日本株（テーマ別）: Japan single-country strategy/ESG indices
    JapanTheme,
    /// 外国株: foreign and global equity indices
    ForeignEquity,
    /// エンハンスト型: long/short and other enhanced strategies
    Enhanced,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::JapanTheme => "日本株（テーマ別）",
            Category::ForeignEquity => "外国株",
            Category::Enhanced => "エンハンスト型",
        }
    }

    /// Parse a CLI filter value; accepts ASCII shorthands and the Japanese
    /// display labels.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "japan" | "japan-theme" | "日本株（テーマ別）" => Some(Category::JapanTheme),
            "foreign" | "global" | "外国株" => Some(Category::ForeignEquity),
            "enhanced" | "エンハンスト型" => Some(Category::Enhanced),
            _ => None,
        }
    }

    pub const ALL: [Category; 3] = [
        Category::JapanTheme,
        Category::ForeignEquity,
        Category::Enhanced,
    ];
}

/// Descriptive record for one ETF, supplied by the catalog, never computed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EtfMeta {
    pub ticker: &'static str,
    pub index_name: &'static str,
    pub fund_name: &'static str,
    pub category: Category,
}

/// The tracked universe, in display order (category-grouped)
pub static UNIVERSE: &[EtfMeta] = &[
    // 日本株（テーマ別）
    EtfMeta {
        ticker: "1477.T",
        index_name: "MSCI 日本株最小分散指数(配当込み)",
        fund_name: "iシェアーズ MSCI 日本株最小分散 ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "1478.T",
        index_name: "MSCI ジャパン高配当利回り指数(配当込み)",
        fund_name: "iシェアーズ MSCI ジャパン高配当利回り ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "1399.T",
        index_name: "MSCIジャパンIMIカスタム高流動性高利回り低ボラティリティ指数",
        fund_name: "上場インデックスファンドMSCI日本株高配当低ボラティリティ",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "1479.T",
        index_name: "MSCI日本株人材設備投資指数(配当込み)",
        fund_name: "iFreeETF MSCI日本株人材設備投資指数",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "1652.T",
        index_name: "MSCI日本株女性活躍指数(配当込み)",
        fund_name: "iFreeETF MSCI日本株女性活躍指数(WIN)",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2518.T",
        index_name: "MSCI 日本株女性活躍指数(セレクト) (配当込み)",
        fund_name: "ＮＥＸＴ ＦＵＮＤＳ ＭＳＣＩ日本株女性活躍指数(セレクト)連動型上場投信",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "1653.T",
        index_name: "MSCIジャパンESGセレクト・リーダーズ指数(配当込み)",
        fund_name: "iFreeETF MSCIジャパンESGセレクト・リーダーズ指数",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2564.T",
        index_name: "MSCI ジャパン・高配当セレクト25指数(配当込み)",
        fund_name: "グローバルＸ MSCIスーパーディビィデンド-日本株式 ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2636.T",
        index_name: "MSCI Japan Governance-Quality Index (配当込み)",
        fund_name: "グローバルＸ MSCI ガバナンス・クオリティ-日本株式 ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2643.T",
        index_name: "MSCI ジャパンカントリー指数(セレクト) (配当込み)",
        fund_name: "NEXT FUNDS MSCIジャパンカントリー指数(セレクト)連動型上場投信",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2848.T",
        index_name: "MSCI Japan Climate Change Index (配当込み)",
        fund_name: "グローバルＸ MSCI 気候変動対応-日本株式 ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2851.T",
        index_name: "MSCIジャパン 700 SRIセレクト指数(配当込み)",
        fund_name: "iシェアーズ MSCI ジャパンSRI ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "2250.T",
        index_name: "MSCIジャパン気候変動アクション指数(配当込み)",
        fund_name: "iシェアーズ MSCI ジャパン気候変動アクション ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "234A.T",
        index_name: "MSCI Japan IMI High Free Cash Flow Yield 50 Select Index (配当込み)",
        fund_name: "グローバルＸ MSCI キャッシュフローキング-日本株式 ETF",
        category: Category::JapanTheme,
    },
    EtfMeta {
        ticker: "294A.T",
        index_name: "MSCIジャパン気候変動指数(セレクト) (配当込み)",
        fund_name: "ＮＥＸＴ ＦＵＮＤＳ ＭＳＣＩジャパン気候変動指数(セレクト)連動型上場投信",
        category: Category::JapanTheme,
    },
    // 外国株
    EtfMeta {
        ticker: "1680.T",
        index_name: "MSCI-KOKUSAIインデックス",
        fund_name: "上場インデックスファンド海外先進国株式(MSCI-KOKUSAI)",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "1550.T",
        index_name: "MSCI-KOKUSAIインデックス",
        fund_name: "MAXIS 海外株式(MSCIコクサイ)上場投信",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "2513.T",
        index_name: "MSCI-KOKUSAIインデックス",
        fund_name: "ＮＥＸＴ ＦＵＮＤＳ 外国株式・ＭＳＣＩ‐ＫＯＫＵＳＡＩ指数(為替ヘッジなし)連動型上場投信",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "2514.T",
        index_name: "MSCI-KOKUSAI指数(円ベース・為替ヘッジあり)",
        fund_name: "ＮＥＸＴ ＦＵＮＤＳ 外国株式・ＭＳＣＩ‐ＫＯＫＵＳＡＩ指数(為替ヘッジあり)連動型上場投信",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "1681.T",
        index_name: "MSCI エマージング・マーケット・インデックス",
        fund_name: "上場インデックスファンド海外新興国株式(MSCIエマージング)",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "2520.T",
        index_name: "MSCI エマージング・マーケット・インデックス",
        fund_name: "ＮＥＸＴ ＦＵＮＤＳ新興国株式・MSCIエマージング・マーケット・インデックス(為替ヘッジなし)連動型上場投信",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "1554.T",
        index_name: "MSCI ACWI ex Japanインデックス",
        fund_name: "上場インデックスファンド世界株式(MSCI ACWI)除く日本",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "2559.T",
        index_name: "MSCI ACWIインデックス",
        fund_name: "ＭＡＸＩＳ全世界株式(オール・カントリー)上場投信",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "1657.T",
        index_name: "MSCI コクサイ指数(税引後配当込み、国内投信用、円建て)",
        fund_name: "iシェアーズ・コア MSCI 先進国株(除く日本)ETF",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "1658.T",
        index_name: "MSCI エマージング・マーケッツ IMI 指数(税引後配当込み、国内投信用、円建て)",
        fund_name: "iシェアーズ・コア MSCI 新興国株 ETF",
        category: Category::ForeignEquity,
    },
    EtfMeta {
        ticker: "273A.T",
        index_name: "ＭＳＣＩ サウジアラビア・インデックス(円換算ベース)",
        fund_name: "ＳＢＩ サウジアラビア株式上場投信",
        category: Category::ForeignEquity,
    },
    // エンハンスト型
    EtfMeta {
        ticker: "1490.T",
        index_name: "MSCIジャパンIMIカスタムロングショート戦略85%+円キャッシュ15%指数",
        fund_name: "上場インデックスファンドMSCI日本株高配当低ボラティリティ(βヘッジ)",
        category: Category::Enhanced,
    },
];

static BY_TICKER: Lazy<HashMap<&'static str, &'static EtfMeta>> =
    Lazy::new(|| UNIVERSE.iter().map(|m| (m.ticker, m)).collect());

/// Look up catalog metadata for a ticker.
pub fn lookup(ticker: &str) -> Option<&'static EtfMeta> {
    BY_TICKER.get(ticker).copied()
}

/// All tickers in the universe, in catalog order.
pub fn tickers() -> impl Iterator<Item = &'static str> {
    UNIVERSE.iter().map(|m| m.ticker)
}

/// Universe entries for one category, in catalog order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static EtfMeta> {
    UNIVERSE.iter().filter(move |m| m.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tickers_are_unique() {
        let set: HashSet<_> = tickers().collect();
        assert_eq!(set.len(), UNIVERSE.len());
    }

    #[test]
    fn test_lookup_known_ticker() {
        let meta = lookup("2559.T").expect("2559.T is in the universe");
        assert_eq!(meta.index_name, "MSCI ACWIインデックス");
        assert_eq!(meta.category, Category::ForeignEquity);
    }

    #[test]
    fn test_lookup_unknown_ticker() {
        assert!(lookup("9999.T").is_none());
    }

    #[test]
    fn test_every_category_is_populated() {
        for cat in Category::ALL {
            assert!(
                by_category(cat).next().is_some(),
                "category {:?} has no entries",
                cat
            );
        }
    }

    #[test]
    fn test_category_parse_shorthands_and_labels() {
        assert_eq!(Category::parse("japan"), Some(Category::JapanTheme));
        assert_eq!(Category::parse("FOREIGN"), Some(Category::ForeignEquity));
        assert_eq!(Category::parse("外国株"), Some(Category::ForeignEquity));
        assert_eq!(Category::parse("enhanced"), Some(Category::Enhanced));
        assert_eq!(Category::parse("bonds"), None);
    }

    #[test]
    fn test_tickers_carry_jpx_suffix() {
        assert!(tickers().all(|t| t.ends_with(".T")));
    }
}
