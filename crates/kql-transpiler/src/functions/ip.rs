//! Function expansion templates for the IP family (spec §4.D). Each
//! function is a pure builder from argument texts + [`AliasCounter`] to a
//! ClickHouse expression string; every alias requested here comes from the
//! same counter the caller holds, so nested composition (`parse_ipv6_mask`
//! composing `parse_ipv4_mask`, `parse_ipv6`, `format_ipv4`) never collides.

use super::FunctionContext;
use crate::alias::AliasCounter;
use crate::error::Result;

/// The CIDR-parsing template (spec §4.D rule 3): one token is a plain IP,
/// two tokens is `IPv4CIDRToRange(ip, mask).1`, more than two is NULL.
/// Returns `(expression, ip_alias)`.
fn cidr_parse_ipv4(input: &str, aliases: &AliasCounter) -> (String, String) {
    let tokens = aliases.fresh("tokens");
    let ip = aliases.fresh("ip");
    let mask = aliases.fresh("mask");
    let expr = format!(
        "multiIf(length(splitByChar('/', {input}) AS {tokens}) = 1, \
IPv4StringToNumOrNull({tokens}[1]) AS {ip}, \
(length({tokens}) = 2) AND ({ip} IS NOT NULL) AND ((toUInt8OrNull({tokens}[-1]) AS {mask}) IS NOT NULL), \
IPv4CIDRToRange(assumeNotNull({ip}), assumeNotNull({mask})).1, NULL)"
    );
    (expr, ip)
}

/// The mask-only half of CIDR parsing, clamped to `[0, 32]` (spec §4.D rule
/// 3/11). Returns `(expression, mask_alias)`.
fn mask_parse_ipv4(input: &str, aliases: &AliasCounter) -> (String, String) {
    let tokens = aliases.fresh("tokens");
    let mask = aliases.fresh("mask");
    let expr = format!(
        "multiIf((length(splitByChar('/', {input}) AS {tokens}) > 2) OR (NOT isIPv4String({tokens}[1])), NULL, \
length({tokens}) = 1, 32, \
(toUInt8OrNull({tokens}[-1]) AS {mask}) IS NULL, NULL, \
toUInt8(min2({mask}, 32)))"
    );
    (expr, mask)
}

/// `format_ipv4` core expression (spec §4.D rule 6): reusable verbatim, up
/// to alias numbering, as a subterm of `format_ipv4_mask` and
/// `parse_ipv6_mask`.
fn format_ipv4_core(input: &str, bound: &str, aliases: &AliasCounter) -> String {
    let param_as_uint32 = aliases.fresh("param_as_uint32");
    let stringified = format!("ifNull(toString({input}), '')");
    let (cidr_expr, _ip_alias) = cidr_parse_ipv4(&stringified, aliases);
    let ip_as_number = aliases.fresh("ip_as_number");
    format!(
        "ifNull(if((((toUInt32OrNull(toString({input})) AS {param_as_uint32}) IS NOT NULL) AND (toTypeName({input}) = 'String')) OR ({bound} < 0) OR ((ifNull({param_as_uint32}, {cidr_expr}) AS {ip_as_number}) IS NULL), NULL, \
IPv4NumToString(bitAnd({ip_as_number}, bitNot(toUInt32(intExp2(32 - {bound}) - 1))))), '')"
    )
}

pub(super) fn format_ipv4(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "format_ipv4", offset)?.to_string();
    let bound = ctx.arg_or(1, "32");
    Ok(format_ipv4_core(&a, &bound, ctx.aliases))
}

pub(super) fn format_ipv4_mask(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "format_ipv4_mask", offset)?.to_string();
    let bound = ctx.arg_or(1, "32");
    let formatted = ctx.aliases.fresh("formatted_ip");
    let core = format_ipv4_core(&a, &bound, ctx.aliases);
    Ok(format!(
        "if(empty({core} AS {formatted}) OR (NOT (({bound} >= 0) AND ({bound} <= 32))), '', concat({formatted}, '/', toString({bound})))"
    ))
}

/// Shared construction for `ipv4_compare`/`ipv4_is_match` (spec §4.D rule 8).
fn ipv4_compare_core(a: &str, b: &str, bound: &str, aliases: &AliasCounter) -> String {
    let (lhs_ip_expr, _) = cidr_parse_ipv4(a, aliases);
    let lhs_ip = aliases.fresh("lhs_ip");
    let (lhs_mask_expr, _) = mask_parse_ipv4(a, aliases);
    let lhs_mask = aliases.fresh("lhs_mask");
    let (rhs_ip_expr, _) = cidr_parse_ipv4(b, aliases);
    let rhs_ip = aliases.fresh("rhs_ip");
    let (rhs_mask_expr, _) = mask_parse_ipv4(b, aliases);
    let rhs_mask = aliases.fresh("rhs_mask");
    let mask = aliases.fresh("mask");

    format!(
        "if((({lhs_ip_expr} AS {lhs_ip}) IS NULL) OR (({lhs_mask_expr} AS {lhs_mask}) IS NULL) OR (({rhs_ip_expr} AS {rhs_ip}) IS NULL) OR (({rhs_mask_expr} AS {rhs_mask}) IS NULL), NULL, \
sign(toInt64(IPv4CIDRToRange(assumeNotNull({lhs_ip}), toUInt8(min2({bound}, min2(assumeNotNull({lhs_mask}), assumeNotNull({rhs_mask})))) AS {mask}).1) - toInt64(IPv4CIDRToRange(assumeNotNull({rhs_ip}), {mask}).1)))"
    )
}

pub(super) fn ipv4_compare(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv4_compare", offset)?.to_string();
    let b = ctx.arg(1, "ipv4_compare", offset)?.to_string();
    let bound = ctx.arg_or(2, "32");
    Ok(ipv4_compare_core(&a, &b, &bound, ctx.aliases))
}

pub(super) fn ipv4_is_match(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv4_is_match", offset)?.to_string();
    let b = ctx.arg(1, "ipv4_is_match", offset)?.to_string();
    let bound = ctx.arg_or(2, "32");
    Ok(format!(
        "{} = 0",
        ipv4_compare_core(&a, &b, &bound, ctx.aliases)
    ))
}

/// Shared construction for `ipv6_compare`/`ipv6_is_match` (spec §4.D rule 8,
/// IPv6 128-bit variant).
fn ipv6_compare_core(a: &str, b: &str, bound: &str, aliases: &AliasCounter) -> String {
    let lhs_tokens = aliases.fresh("lhs_tokens");
    let rhs_tokens = aliases.fresh("rhs_tokens");
    let lhs_ipv6 = aliases.fresh("lhs_ipv6");
    let lhs_suffix = aliases.fresh("lhs_suffix");
    let rhs_ipv6 = aliases.fresh("rhs_ipv6");
    let rhs_suffix = aliases.fresh("rhs_suffix");
    let suffix = aliases.fresh("suffix");
    let zeroes = aliases.fresh("zeroes");
    let mask = aliases.fresh("mask");
    let lhs_base = aliases.fresh("lhs_base");
    let rhs_base = aliases.fresh("rhs_base");

    format!(
        "if((length(splitByChar('/', {a}) AS {lhs_tokens}) > 2) OR (length(splitByChar('/', {b}) AS {rhs_tokens}) > 2) OR \
((IPv6StringToNumOrNull({lhs_tokens}[1]) AS {lhs_ipv6}) IS NULL) OR \
((length({lhs_tokens}) = 2) AND (((if(isIPv4String({lhs_tokens}[1]), 96, 0) + toUInt8OrNull({lhs_tokens}[-1])) AS {lhs_suffix}) IS NULL)) OR \
((IPv6StringToNumOrNull({rhs_tokens}[1]) AS {rhs_ipv6}) IS NULL) OR \
((length({rhs_tokens}) = 2) AND (((if(isIPv4String({rhs_tokens}[1]), 96, 0) + toUInt8OrNull({rhs_tokens}[-1])) AS {rhs_suffix}) IS NULL)) OR \
((toUInt8(min2({bound}, min2(ifNull({lhs_suffix}, {bound}), ifNull({rhs_suffix}, {bound})))) AS {suffix}) IS NULL) OR \
((bitShiftLeft(bitShiftRight(bitNot(reinterpretAsFixedString(CAST('0', 'UInt128'))), 128 - {suffix} AS {zeroes}), {zeroes}) AS {mask}) IS NULL) OR \
((bitAnd({lhs_ipv6}, {mask}) AS {lhs_base}) IS NULL) OR \
((bitAnd({rhs_ipv6}, {mask}) AS {rhs_base}) IS NULL), NULL, \
multiIf({lhs_base} < {rhs_base}, -1, {lhs_base} > {rhs_base}, 1, 0))"
    )
}

pub(super) fn ipv6_compare(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv6_compare", offset)?.to_string();
    let b = ctx.arg(1, "ipv6_compare", offset)?.to_string();
    let bound = ctx.arg_or(2, "128");
    Ok(ipv6_compare_core(&a, &b, &bound, ctx.aliases))
}

pub(super) fn ipv6_is_match(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv6_is_match", offset)?.to_string();
    let b = ctx.arg(1, "ipv6_is_match", offset)?.to_string();
    let bound = ctx.arg_or(2, "128");
    Ok(format!(
        "{} = 0",
        ipv6_compare_core(&a, &b, &bound, ctx.aliases)
    ))
}

pub(super) fn ipv4_is_in_range(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv4_is_in_range", offset)?.to_string();
    let b = ctx.arg(1, "ipv4_is_in_range", offset)?.to_string();
    let aliases = ctx.aliases;

    let ip = aliases.fresh("ip");
    let (range_start_expr, _) = cidr_parse_ipv4(&b, aliases);
    let range_start_ip = aliases.fresh("range_start_ip");
    let (range_mask_expr, _) = mask_parse_ipv4(&b, aliases);
    let range_mask = aliases.fresh("range_mask");

    Ok(format!(
        "if(((IPv4StringToNumOrNull({a}) AS {ip}) IS NULL) OR (({range_start_expr} AS {range_start_ip}) IS NULL) OR (({range_mask_expr} AS {range_mask}) IS NULL), NULL, \
bitXor({range_start_ip}, bitAnd({ip}, bitNot(toUInt32(intExp2(32 - {range_mask}) - 1)))) = 0)"
    ))
}

pub(super) fn ipv4_is_private(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv4_is_private", offset)?.to_string();
    let aliases = ctx.aliases;

    let tokens = aliases.fresh("tokens");
    let nullable_ip = aliases.fresh("nullable_ip");
    let mask = aliases.fresh("mask");
    let ip = aliases.fresh("ip");
    let range = aliases.fresh("range");
    let begin = aliases.fresh("begin");
    let end = aliases.fresh("end");

    let blocks = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];
    let block_checks: Vec<String> = blocks
        .iter()
        .map(|b| {
            format!(
                "((length({tokens}) = 1) AND isIPAddressInRange(IPv4NumToString({ip}), '{b}')) OR \
((length({tokens}) = 2) AND isIPAddressInRange({begin}, '{b}') AND isIPAddressInRange({end}, '{b}'))"
            )
        })
        .collect();

    Ok(format!(
        "multiIf((length(splitByChar('/', {a}) AS {tokens}) > 2) OR ((toIPv4OrNull({tokens}[1]) AS {nullable_ip}) IS NULL) OR ((length({tokens}) = 2) AND ((toUInt8OrNull({tokens}[-1]) AS {mask}) IS NULL)), NULL, \
ignore(assumeNotNull({nullable_ip}) AS {ip}, IPv4CIDRToRange({ip}, assumeNotNull({mask})) AS {range}, IPv4NumToString({range}.1) AS {begin}, IPv4NumToString({range}.2) AS {end}), NULL, \
{})",
        block_checks.join(" OR ")
    ))
}

pub(super) fn ipv4_netmask_suffix(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "ipv4_netmask_suffix", offset)?.to_string();
    let (expr, _) = mask_parse_ipv4(&a, ctx.aliases);
    Ok(expr)
}

pub(super) fn parse_ipv4(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "parse_ipv4", offset)?.to_string();
    let (expr, _) = cidr_parse_ipv4(&a, ctx.aliases);
    Ok(expr)
}

pub(super) fn parse_ipv4_mask(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "parse_ipv4_mask", offset)?.to_string();
    let b = ctx.arg(1, "parse_ipv4_mask", offset)?.to_string();
    Ok(parse_ipv4_mask_core(&a, &b, ctx.aliases))
}

fn parse_ipv4_mask_core(a: &str, b: &str, aliases: &AliasCounter) -> String {
    let ip = aliases.fresh("ip");
    let mask = aliases.fresh("mask");
    format!(
        "if(((toIPv4OrNull({a}) AS {ip}) IS NULL) OR ((toUInt8OrNull(toString({b})) AS {mask}) IS NULL), NULL, \
toUInt32(IPv4CIDRToRange(assumeNotNull({ip}), toUInt8(max2(0, min2(32, assumeNotNull({mask}))))).1))"
    )
}

fn parse_ipv6_core(input: &str, aliases: &AliasCounter) -> String {
    let tokens = aliases.fresh("tokens");
    let ip = aliases.fresh("ip");
    let mask = aliases.fresh("mask");
    format!(
        "if((length(splitByChar('/', {input}) AS {tokens}) > 2) OR ((IPv6StringToNumOrNull({tokens}[1]) AS {ip}) IS NULL) OR ((length({tokens}) = 2) AND ((toUInt8OrNull({tokens}[-1]) AS {mask}) IS NULL)), NULL, \
arrayStringConcat(flatten(extractAllGroups(lower(hex(IPv6CIDRToRange(assumeNotNull({ip}), toUInt8(ifNull({mask} + if(isIPv4String({tokens}[1]), 96, 0), 128))).1)), '([\\da-f]{{4}})')), ':'))"
    )
}

pub(super) fn parse_ipv6(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "parse_ipv6", offset)?.to_string();
    Ok(parse_ipv6_core(&a, ctx.aliases))
}

pub(super) fn parse_ipv6_mask(ctx: &FunctionContext, offset: usize) -> Result<String> {
    let a = ctx.arg(0, "parse_ipv6_mask", offset)?.to_string();
    let b = ctx.arg(1, "parse_ipv6_mask", offset)?.to_string();
    let aliases = ctx.aliases;

    let ipv4_mask_expr = parse_ipv4_mask_core(&a, &b, aliases);
    let ipv4 = aliases.fresh("ipv4");
    let ipv6_direct = parse_ipv6_core(&a, aliases);
    let formatted_ipv4 = format_ipv4_core(&ipv4, "32", aliases);
    let composed_input =
        format!("concat(ifNull(toString({formatted_ipv4}), ''), '/', ifNull(toString({b}), ''))");
    let ipv6_from_ipv4 = parse_ipv6_core(&composed_input, aliases);

    Ok(format!(
        "if(({ipv4_mask_expr} AS {ipv4}) IS NULL, {ipv6_direct}, {ipv6_from_ipv4})"
    ))
}
