//! 금융 계산용 Decimal 타입 별칭과 보조 함수.

use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Quantity = Decimal;

/// 변화율 타입 (0.01 = 1%).
pub type Ratio = Decimal;

/// 분모가 0이면 `None`을 반환하는 나눗셈.
///
/// 지표 계산에서 0으로 나누는 경우를 "정의되지 않음"으로 표현하기 위해 사용합니다.
pub fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// `base`에서 `current`로의 변화율 `(current - base) / base`.
pub fn pct_change(current: Decimal, base: Decimal) -> Option<Ratio> {
    checked_ratio(current - base, base)
}
