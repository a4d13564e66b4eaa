use crate::valuation::normalize::strip_exchange_suffix;

/// Icon pack hosting one PNG per exchange-listed ticker
const STOCK_LOGO_BASE: &str = "https://cdn.jsdelivr.net/gh/thefintz/icon-project@master/stock_logos";

/// Favicon service used for tickers with a known company domain
const FAVICON_BASE: &str = "https://www.google.com/s2/favicons";

const CRYPTO_LOGOS: &[(&str, &str)] = &[
    ("BTC", "https://assets.coingecko.com/coins/images/1/small/bitcoin.png"),
    ("BITCOIN", "https://assets.coingecko.com/coins/images/1/small/bitcoin.png"),
    ("ETH", "https://assets.coingecko.com/coins/images/279/small/ethereum.png"),
    ("ETHEREUM", "https://assets.coingecko.com/coins/images/279/small/ethereum.png"),
    ("SOL", "https://assets.coingecko.com/coins/images/4128/small/solana.png"),
    ("SOLANA", "https://assets.coingecko.com/coins/images/4128/small/solana.png"),
];

const COMPANY_DOMAINS: &[(&str, &str)] = &[
    ("BBAS3", "bb.com.br"),
    ("BBSE3", "bbseguridaderi.com.br"),
    ("ITUB4", "itau.com.br"),
    ("BBDC4", "bradesco.com.br"),
    ("SANB11", "santander.com.br"),
    ("PETR4", "petrobras.com.br"),
    ("VALE3", "vale.com"),
    ("WEGE3", "weg.net"),
    ("CMIG4", "cemig.com.br"),
    ("SAPR4", "sanepar.com.br"),
    ("SAPR11", "sanepar.com.br"),
    ("ISAE4", "isacteep.com.br"),
    ("TRPL4", "isacteep.com.br"),
    ("CXSE3", "caixaseguridade.com.br"),
    ("ODPV3", "odontoprev.com.br"),
    ("TAEE11", "taesa.com.br"),
    ("KLBN11", "klabin.com.br"),
    ("SUZB3", "suzano.com.br"),
    ("JBSS3", "jbs.com.br"),
    ("ABEV3", "ambev.com.br"),
    ("EGIE3", "engie.com.br"),
    ("VIVT3", "vivo.com.br"),
    ("TIMS3", "tim.com.br"),
    ("B3SA3", "b3.com.br"),
    ("XP", "xp.com.br"),
    ("NU", "nubank.com.br"),
    ("MXRF11", "xp.com.br"),
    ("HGLG11", "cshg.com.br"),
    ("KNCA11", "kinea.com.br"),
    ("KNIP11", "kinea.com.br"),
    ("XPLG11", "xp.com.br"),
    ("VISC11", "vinci-partners.com"),
];

fn lookup(table: &[(&str, &'static str)], ticker: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == ticker)
        .map(|(_, value)| *value)
}

/// Resolves a display logo for a ticker.
///
/// Crypto assets map to fixed CoinGecko images, tickers with a known company
/// domain to its favicon, and everything else to the stock icon pack.
pub fn logo_url(ticker: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    let ticker = strip_exchange_suffix(&ticker);
    if let Some(url) = lookup(CRYPTO_LOGOS, ticker) {
        url.to_owned()
    } else if let Some(domain) = lookup(COMPANY_DOMAINS, ticker) {
        format!("{}?domain={}&sz=128", FAVICON_BASE, domain)
    } else {
        format!("{}/{}.png", STOCK_LOGO_BASE, ticker)
    }
}
